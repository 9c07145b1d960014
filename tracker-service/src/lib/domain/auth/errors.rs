use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for email delivery operations
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Failed to build email message: {0}")]
    BuildFailed(String),

    #[error("Failed to deliver email: {0}")]
    DeliveryFailed(String),
}

/// Top-level error for all authentication operations.
///
/// The first seven variants are terminal validation failures surfaced
/// directly to the HTTP layer; the rest are infrastructure failures.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Account not confirmed: {0}")]
    UserNotEnabled(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token already used")]
    TokenAlreadyUsed,

    #[error("Token has expired")]
    TokenExpired,

    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Access token error: {0}")]
    AccessToken(#[from] auth::JwtError),

    #[error("Email delivery error: {0}")]
    Email(#[from] MailerError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
