//! Error types for Ledger Core

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("Password does not meet policy: {0}")]
    WeakPassword(String),

    /// Wrong password and unknown username collapse into this one variant.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Covers both a missing and an expired session.
    #[error("Session expired or not found")]
    SessionExpired,

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// The record changed between read and write on every attempt.
    #[error("{0} was changed concurrently")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// Persistence failures are worth retrying, everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Timeout | Error::Conflict(_))
    }

    /// Text safe to show an end user. Never includes internal state.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidCredentials => "Invalid username or password.".to_string(),
            Error::SessionExpired => "Your session has ended. Please log in again.".to_string(),
            Error::DuplicateUsername => "That username is already taken.".to_string(),
            Error::WeakPassword(reason) => format!("Password too weak: {}.", reason),
            Error::Validation { field, message } => format!("Invalid {}: {}.", field, message),
            Error::NotFound(what) => format!("{} not found.", what),
            Error::Conflict(what) => format!("{} changed while saving. Please try again.", what),
            Error::Database(_) | Error::Timeout => {
                "The service is unavailable right now. Please try again.".to_string()
            }
            _ => "Something went wrong.".to_string(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => Error::Timeout,
            _ => Error::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
