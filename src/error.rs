//! Centralized error types for mailboard.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailboard library.
#[derive(Error, Debug)]
pub enum MailboardError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A Base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A quoted-printable payload could not be decoded.
    #[error("invalid quoted-printable payload: {0}")]
    QuotedPrintable(String),

    /// The board store rejected a record.
    #[error("Board store error: {0}")]
    Store(String),

    /// The notification could not be delivered.
    #[error("Notification error: {0}")]
    Notify(String),

    /// The reply could not be dispatched.
    #[error("Reply dispatch error: {0}")]
    Reply(String),

    /// The configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias for `Result<T, MailboardError>`.
pub type Result<T> = std::result::Result<T, MailboardError>;

impl MailboardError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `MailboardError::io`).
impl From<std::io::Error> for MailboardError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
