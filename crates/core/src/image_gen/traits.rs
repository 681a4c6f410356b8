use std::path::PathBuf;

use async_trait::async_trait;

use super::ImageGenError;

/// Text-to-image service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Request an image for `prompt`; returns the URL of the first result.
    async fn generate(&self, prompt: &str) -> Result<String, ImageGenError>;

    /// Fetch `url` into a new, uniquely named local file.
    async fn download(&self, url: &str) -> Result<PathBuf, ImageGenError>;
}
