//! Unified application error type.
//! Store, remote clients, repositories and the CLI all return AppError;
//! repositories turn it into a `Resource::Error` at their boundary.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Local cache
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Foreign key violation while writing {table}: {message}")]
    ConstraintViolation { table: &'static str, message: String },

    // ---------------------------
    // Remote
    // ---------------------------
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server responded with {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected response payload: {0}")]
    Deserialization(String),

    #[error("Request cancelled")]
    Cancelled,

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Message shown to the user when a sync or mutation fails.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport(_) => "Unable to reach the server, showing cached data".to_string(),
            AppError::Http { status, .. } if *status == 401 || *status == 403 => {
                "Access denied by the server".to_string()
            }
            AppError::Http { status, .. } => format!("Server error ({status})"),
            AppError::Deserialization(_) => "Server sent data in an unexpected format".to_string(),
            AppError::Cancelled => "Request cancelled".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, AppError::ConstraintViolation { .. })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::Deserialization(e.to_string())
        } else if let Some(status) = e.status() {
            AppError::Http {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            AppError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Deserialization(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
