use std::path::Path;

use async_trait::async_trait;

use super::{PublishError, PublishedVideo, VideoMetadata};

/// Video hosting upload.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &str;

    /// Upload `video` with `metadata`; returns the remote resource.
    async fn publish(
        &self,
        video: &Path,
        metadata: &VideoMetadata,
    ) -> Result<PublishedVideo, PublishError>;
}
