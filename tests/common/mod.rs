//! Shared helpers for integration tests.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use loaner::db::{DbPool, establish_connection_pool};
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Migrated SQLite database living in a temporary directory.
///
/// The directory, and the database files with it, are removed on drop.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("connection pool");

        let mut conn = pool.get().expect("connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("migrations");

        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}
