//! Mock publisher for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::publisher::{PublishError, PublishedVideo, Publisher, VideoMetadata};

/// A recorded upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPublish {
    pub video: PathBuf,
    pub metadata: VideoMetadata,
}

/// Mock implementation of the Publisher trait.
#[derive(Debug)]
pub struct MockPublisher {
    uploads: Arc<RwLock<Vec<RecordedPublish>>>,
    next_error: Arc<RwLock<Option<PublishError>>>,
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn recorded_uploads(&self) -> Vec<RecordedPublish> {
        self.uploads.read().await.clone()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Configure the next upload to fail with the given error.
    pub async fn set_next_error(&self, error: PublishError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(
        &self,
        video: &Path,
        metadata: &VideoMetadata,
    ) -> Result<PublishedVideo, PublishError> {
        let mut uploads = self.uploads.write().await;
        uploads.push(RecordedPublish {
            video: video.to_path_buf(),
            metadata: metadata.clone(),
        });
        let n = uploads.len();
        drop(uploads);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        Ok(PublishedVideo::youtube(format!("mock-video-{}", n)))
    }
}
