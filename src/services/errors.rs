use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error("internal error")]
    Internal,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ConstraintViolation(message) => ServiceError::Conflict(message),
            other => ServiceError::Repository(other),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(err.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_become_not_found() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
    }

    #[test]
    fn constraint_violations_become_conflicts() {
        let err = ServiceError::from(RepositoryError::ConstraintViolation("dup".into()));
        assert!(matches!(err, ServiceError::Conflict(message) if message == "dup"));
    }

    #[test]
    fn connection_errors_are_wrapped() {
        let err = ServiceError::from(RepositoryError::ConnectionError("down".into()));
        assert_eq!(err.to_string(), "Connection error: down");
    }
}
