//! Error types shared by the mailsink crates
//!
//! SMTP protocol failures never surface here; the session turns them into
//! reply codes. These errors come from configuration and storage, and the
//! API maps each one to an HTTP status.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Rejected input, such as an empty SMTP user name
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique column already holds the value
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status the API answers with
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 422,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::Config(_) | Error::Database(_) | Error::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
