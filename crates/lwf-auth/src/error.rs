//! Error types for authentication.

use thiserror::Error;

/// Authentication-specific errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The user does not hold the role being removed.
    #[error("the user doesn't have role {0}")]
    MissingRole(String),

    /// Unknown authentication state code.
    #[error("invalid authentication state {0}")]
    InvalidState(u8),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHashError,

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
