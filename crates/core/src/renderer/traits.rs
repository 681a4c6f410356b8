//! Trait definitions for the renderer module.

use async_trait::async_trait;
use std::path::Path;

use super::error::RenderError;
use super::types::{MediaInfo, RenderJob, RenderResult};

/// Turns a still frame and an audio clip into a video file.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the name of this renderer implementation.
    fn name(&self) -> &str;

    /// Encode the video described by `job`.
    async fn render(&self, job: RenderJob) -> Result<RenderResult, RenderError>;

    /// Read duration, frame rate and resolution of a media file.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, RenderError>;

    /// Check that the encoder tooling is installed.
    async fn validate(&self) -> Result<(), RenderError>;
}
