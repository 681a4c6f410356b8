//! OpenAI-compatible image generation client (ImageRouter by default).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{ImageGenError, ImageGenerator};
use crate::config::{ImageConfig, NetworkConfig};
use crate::retry::{with_retry, RetryConfig};

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    prompt: &'a str,
    model: &'a str,
}

/// Pull `data[0].url` out of a generation response.
pub fn extract_image_url(body: &Value) -> Result<String, ImageGenError> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ImageGenError::MissingImageUrl("response has no 'data' list".to_string()))?;
    let first = data
        .first()
        .ok_or_else(|| ImageGenError::MissingImageUrl("'data' list is empty".to_string()))?;
    first
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ImageGenError::MissingImageUrl("first result has no 'url'".to_string()))
}

pub struct ImageRouterClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    images_dir: PathBuf,
    retry: RetryConfig,
}

impl ImageRouterClient {
    pub fn new(
        config: &ImageConfig,
        api_key: impl Into<String>,
        network: &NetworkConfig,
    ) -> Result<Self, ImageGenError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(network.timeout_secs))
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
            .build()
            .map_err(ImageGenError::from_reqwest)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
            images_dir: config.images_dir.clone(),
            retry: RetryConfig::from(network),
        })
    }

    async fn request_once(&self, prompt: &str) -> Result<Value, ImageGenError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&GenerationRequest {
                prompt,
                model: &self.model,
            })
            .send()
            .await
            .map_err(ImageGenError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageGenError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ImageGenError::MissingImageUrl(format!("response is not JSON: {}", e)))
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>, ImageGenError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ImageGenError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageGenError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(ImageGenError::from_reqwest)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for ImageRouterClient {
    fn name(&self) -> &str {
        "imagerouter"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ImageGenError> {
        debug!(model = %self.model, "Requesting image generation");
        let body = with_retry(&self.retry, "image.generate", || self.request_once(prompt)).await?;
        let url = extract_image_url(&body)?;
        info!("Image URL: {}", url);
        Ok(url)
    }

    async fn download(&self, url: &str) -> Result<PathBuf, ImageGenError> {
        let bytes = with_retry(&self.retry, "image.download", || self.fetch_once(url)).await?;

        tokio::fs::create_dir_all(&self.images_dir).await?;
        let path = self
            .images_dir
            .join(format!("{}.jpg", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, &bytes).await?;

        info!(bytes = bytes.len(), "Image saved as {}", path.display());
        Ok(path)
    }
}
