//! Authentication ports.

use crate::domain::UserId;

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Signs and verifies the legacy user-id credential.
///
/// Deprecated identity path: the server only reads these tokens, as a
/// fallback when no valid session exists.
pub trait TokenService: Send + Sync {
    /// Sign a credential naming `user_id`.
    fn generate_token(&self, user_id: UserId) -> Result<String, AuthError>;

    /// Verify a credential and return the user id it names.
    fn validate_token(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
