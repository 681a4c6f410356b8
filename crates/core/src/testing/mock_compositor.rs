//! Mock compositor for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::compositor::{CompositeError, Compositor};

/// A recorded composite call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedComposite {
    pub image: PathBuf,
    pub quote: String,
}

/// Mock implementation of the Compositor trait.
#[derive(Debug)]
pub struct MockCompositor {
    calls: Arc<RwLock<Vec<RecordedComposite>>>,
    output_path: PathBuf,
    next_error: Arc<RwLock<Option<CompositeError>>>,
}

impl Default for MockCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompositor {
    pub fn new() -> Self {
        Self::with_output("quote_image.jpg")
    }

    /// A compositor reporting `output` as the frame path.
    pub fn with_output(output: impl Into<PathBuf>) -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            output_path: output.into(),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedComposite> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: CompositeError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Compositor for MockCompositor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn composite(&self, image: &Path, quote: &str) -> Result<PathBuf, CompositeError> {
        self.calls.write().await.push(RecordedComposite {
            image: image.to_path_buf(),
            quote: quote.to_string(),
        });
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        Ok(self.output_path.clone())
    }
}
