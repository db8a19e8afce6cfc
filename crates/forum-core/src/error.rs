//! Domain-level error types.

use thiserror::Error;

use crate::ports::AuthError;

/// Domain errors - business logic failures.
///
/// None of these are retried by the core. `StorageUnavailable` is the only
/// variant a caller may retry with backoff.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Session expired")]
    Expired,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Connection(msg) | RepoError::Query(msg) => Self::StorageUnavailable(msg),
            RepoError::NotFound => Self::NotFound {
                entity_type: "entity",
                id: String::new(),
            },
            RepoError::Constraint(msg) => Self::Conflict(msg),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => Self::Expired,
            AuthError::InvalidToken(_) => Self::InvalidCredential,
            AuthError::HashingError(msg) => Self::Internal(msg),
        }
    }
}
