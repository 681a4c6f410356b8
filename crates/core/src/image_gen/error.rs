use thiserror::Error;

use crate::retry::Retryable;

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Image API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response carried no `data[0].url`.
    #[error("Failed to retrieve image URL: {0}")]
    MissingImageUrl(String),

    #[error("Image download failed: {status} from {url}")]
    Download { url: String, status: u16 },

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image API unavailable: {operation} failed after {attempts} attempts: {reason}")]
    UpstreamUnavailable {
        operation: String,
        attempts: u32,
        reason: String,
    },
}

impl ImageGenError {
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

impl Retryable for ImageGenError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection(_) => true,
            Self::Api { status, .. } | Self::Download { status, .. } => {
                *status == 429 || *status >= 500
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_response_not_retryable() {
        assert!(!ImageGenError::MissingImageUrl("empty data".to_string()).is_retryable());
        assert!(!ImageGenError::Api {
            status: 401,
            message: String::new()
        }
        .is_retryable());
        assert!(ImageGenError::Download {
            url: "u".to_string(),
            status: 502
        }
        .is_retryable());
    }
}
