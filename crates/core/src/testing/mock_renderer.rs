//! Mock renderer for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::renderer::{MediaInfo, RenderError, RenderJob, RenderResult, Renderer};

/// Mock implementation of the Renderer trait.
///
/// Reports media that exactly matches each job's contract unless
/// [`MockRenderer::set_media_override`] says otherwise; the contract is
/// still checked, so a bad override surfaces as `ContractViolation`.
#[derive(Debug)]
pub struct MockRenderer {
    jobs: Arc<RwLock<Vec<RenderJob>>>,
    media_override: Arc<RwLock<Option<MediaInfo>>>,
    next_error: Arc<RwLock<Option<RenderError>>>,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            media_override: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded render jobs.
    pub async fn recorded_jobs(&self) -> Vec<RenderJob> {
        self.jobs.read().await.clone()
    }

    pub async fn render_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Report `info` as the probe of every rendered file.
    pub async fn set_media_override(&self, info: MediaInfo) {
        *self.media_override.write().await = Some(info);
    }

    /// Configure the next render to fail with the given error.
    pub async fn set_next_error(&self, error: RenderError) {
        *self.next_error.write().await = Some(error);
    }

    fn conforming_media(job: &RenderJob) -> MediaInfo {
        MediaInfo {
            path: job.output_path.clone(),
            size_bytes: 2 * 1024 * 1024,
            duration_secs: job.contract.duration_secs,
            format: "mov".to_string(),
            video_codec: Some("h264".to_string()),
            video_width: Some(job.contract.height),
            video_height: Some(job.contract.height),
            video_fps: Some(job.contract.fps as f64),
            audio_codec: Some("aac".to_string()),
        }
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render(&self, job: RenderJob) -> Result<RenderResult, RenderError> {
        self.jobs.write().await.push(job.clone());
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let media = match self.media_override.read().await.clone() {
            Some(media) => media,
            None => Self::conforming_media(&job),
        };
        job.contract.check(&media)?;

        Ok(RenderResult {
            size_bytes: media.size_bytes,
            output_path: job.output_path,
            elapsed_ms: 0,
            media: Some(media),
        })
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, RenderError> {
        match self.media_override.read().await.clone() {
            Some(media) => Ok(media),
            None => Err(RenderError::InputNotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    async fn validate(&self) -> Result<(), RenderError> {
        Ok(())
    }
}
