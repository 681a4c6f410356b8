//! Error types for the queue module.

use thiserror::Error;

use crate::auth::AuthError;
use crate::retry::Retryable;

/// Errors that can occur while reading or updating the queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// A required header column is absent.
    #[error("Queue header is missing column '{column}'")]
    MissingColumn { column: String },

    /// No spreadsheet with the configured name is visible to the credentials.
    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    /// Spreadsheet has no worksheets.
    #[error("Spreadsheet {0} has no worksheets")]
    NoWorksheet(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Sheets API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Another run overwrote our claim marker.
    #[error("Row {row} was claimed by another run (status is now '{found}')")]
    ClaimLost { row: usize, found: String },

    /// Row or column index 0 (indices are 1-based).
    #[error("Invalid cell index ({row}, {col})")]
    InvalidIndex { row: usize, col: usize },

    #[error("Queue backend unavailable: {operation} failed after {attempts} attempts: {reason}")]
    UpstreamUnavailable {
        operation: String,
        attempts: u32,
        reason: String,
    },
}

impl QueueError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }

    /// Whether this error points at configuration rather than the backend.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. } | Self::SpreadsheetNotFound(_) | Self::NoWorksheet(_)
        )
    }
}

impl Retryable for QueueError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    fn exhausted(self, operation: &str, attempts: u32) -> Self {
        Self::UpstreamUnavailable {
            operation: operation.to_string(),
            attempts,
            reason: self.to_string(),
        }
    }
}
