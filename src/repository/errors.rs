use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Unique, foreign key or check constraint rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,

            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => RepositoryError::ConstraintViolation(
                        format!("Unique constraint violation: {message}"),
                    ),
                    DatabaseErrorKind::ForeignKeyViolation => RepositoryError::ConstraintViolation(
                        format!("Foreign key constraint violation: {message}"),
                    ),
                    DatabaseErrorKind::CheckViolation => RepositoryError::ConstraintViolation(
                        format!("Check constraint violation: {message}"),
                    ),
                    _ => RepositoryError::DatabaseError(message),
                }
            }

            DieselError::SerializationError(e) | DieselError::DeserializationError(e) => {
                RepositoryError::ValidationError(format!("Row conversion error: {e}"))
            }

            DieselError::RollbackTransaction
            | DieselError::AlreadyInTransaction
            | DieselError::NotInTransaction
            | DieselError::BrokenTransactionManager => {
                RepositoryError::DatabaseError(format!("Transaction error: {err}"))
            }

            _ => RepositoryError::Unexpected(format!("Unexpected diesel error: {err}")),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

/// Stored rows that no longer satisfy domain invariants surface as validation errors.
impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_preserved() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn type_constraints_become_validation_errors() {
        let err = RepositoryError::from(TypeConstraintError::EmptyString);
        assert!(matches!(err, RepositoryError::ValidationError(msg) if msg == "value cannot be empty"));
    }
}
