//! Mock image generator for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::image_gen::{ImageGenError, ImageGenerator};

/// Mock implementation of the ImageGenerator trait.
///
/// Records prompts and downloads; `download` only invents a path, it does
/// not touch the filesystem.
#[derive(Debug)]
pub struct MockImageGenerator {
    prompts: Arc<RwLock<Vec<String>>>,
    downloads: Arc<RwLock<Vec<String>>>,
    image_url: Arc<RwLock<String>>,
    next_error: Arc<RwLock<Option<ImageGenError>>>,
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageGenerator {
    pub fn new() -> Self {
        Self {
            prompts: Arc::new(RwLock::new(Vec::new())),
            downloads: Arc::new(RwLock::new(Vec::new())),
            image_url: Arc::new(RwLock::new("https://images.example/generated.jpg".to_string())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Prompts sent to `generate`.
    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }

    /// URLs passed to `download`.
    pub async fn recorded_downloads(&self) -> Vec<String> {
        self.downloads.read().await.clone()
    }

    /// Total calls to either method.
    pub async fn call_count(&self) -> usize {
        self.prompts.read().await.len() + self.downloads.read().await.len()
    }

    pub async fn set_image_url(&self, url: &str) {
        *self.image_url.write().await = url.to_string();
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: ImageGenError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<ImageGenError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ImageGenError> {
        self.prompts.write().await.push(prompt.to_string());
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.image_url.read().await.clone())
    }

    async fn download(&self, url: &str) -> Result<PathBuf, ImageGenError> {
        let mut downloads = self.downloads.write().await;
        downloads.push(url.to_string());
        let n = downloads.len();
        drop(downloads);

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(PathBuf::from(format!("images/mock-{}.jpg", n)))
    }
}
