use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("Failed to load image {path}: {reason}")]
    ImageLoad { path: String, reason: String },

    /// Neither the primary font nor any fallback could be loaded.
    #[error("No usable font (tried: {})", tried.join(", "))]
    FontUnavailable { tried: Vec<String> },

    #[error("Failed to save frame {path}: {reason}")]
    Save { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Compositor task failed: {0}")]
    Task(String),
}

impl CompositeError {
    /// Local drawing failures never heal on their own.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
