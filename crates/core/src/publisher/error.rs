use thiserror::Error;

use crate::auth::AuthError;
use crate::retry::Retryable;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Upload API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The session request succeeded without a `Location` header.
    #[error("Upload session URI missing from response")]
    MissingSessionUri,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Video file is empty: {0}")]
    EmptyVideo(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload API unavailable: {operation} failed after {attempts} attempts: {reason}")]
    UpstreamUnavailable {
        operation: String,
        attempts: u32,
        reason: String,
    },
}

impl PublishError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

impl Retryable for PublishError {
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
