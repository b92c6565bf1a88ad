//! Auth error types.

/// Errors produced by account and session operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The email address is not plausibly shaped.
    #[error("invalid email address")]
    InvalidEmail,

    /// Password below the configured minimum length.
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Unknown email or wrong password. Deliberately indistinguishable so
    /// callers can't probe which emails are registered.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session token unknown or expired.
    #[error("invalid or expired session")]
    InvalidSession,

    /// Password hashing failed.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
