//! SQLite connection pool shared by the repositories.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every connection handed out by the pool.
#[derive(Debug)]
pub struct ConnectionOptions {
    /// Write-ahead logging, so status reads do not wait on admin writes.
    pub enable_wal: bool,
    /// Needed for `devices.shelf_id` and `device_events.device_id` references.
    pub enable_foreign_keys: bool,
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            enable_wal: true,
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ConnectionOptions {
    fn pragmas(&self) -> String {
        let mut sql = String::new();
        if self.enable_wal {
            sql.push_str("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        }
        if self.enable_foreign_keys {
            sql.push_str("PRAGMA foreign_keys = ON;");
        }
        if let Some(timeout) = self.busy_timeout {
            sql.push_str(&format!("PRAGMA busy_timeout = {};", timeout.as_millis()));
        }
        sql
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        let pragmas = self.pragmas();
        if pragmas.is_empty() {
            return Ok(());
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool for `database_url` with the default [`ConnectionOptions`].
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection, PoolError> {
    pool.get().inspect_err(|err| {
        log::error!("Failed to get connection from pool: {err}");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pragmas_follow_options() {
        let options = ConnectionOptions {
            enable_wal: false,
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_millis(250)),
        };
        assert_eq!(
            options.pragmas(),
            "PRAGMA foreign_keys = ON;PRAGMA busy_timeout = 250;"
        );

        let none = ConnectionOptions {
            enable_wal: false,
            enable_foreign_keys: false,
            busy_timeout: None,
        };
        assert!(none.pragmas().is_empty());
    }

    #[test]
    fn pool_hands_out_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.db");
        let pool = establish_connection_pool(path.to_str().unwrap()).unwrap();

        let mut conn = get_connection(&pool).unwrap();
        conn.batch_execute("CREATE TABLE scratch (id INTEGER PRIMARY KEY);")
            .unwrap();
    }
}
