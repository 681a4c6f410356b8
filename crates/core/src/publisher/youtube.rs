//! YouTube Data API v3 resumable upload.
//!
//! A session is opened with the video metadata, then the file is sent in
//! sequential chunks. The server answers `308 Resume Incomplete` with the
//! byte range it has so far until the last chunk, which returns the video
//! resource.

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_RANGE, LOCATION, RANGE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info};

use super::{PublishError, PublishedVideo, Publisher, VideoMetadata};
use crate::auth::TokenSource;
use crate::config::{NetworkConfig, PublishConfig};
use crate::retry::{with_retry, RetryConfig};

/// Chunk sizes must be a multiple of this (256 KiB).
pub const UPLOAD_CHUNK_GRANULARITY: usize = 256 * 1024;

const VIDEO_MIME: &str = "video/*";

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
}

/// Outcome of sending one chunk.
enum ChunkResponse {
    /// Upload incomplete; next byte to send.
    Resume(u64),
    Done(PublishedVideo),
}

/// Next offset from a `Range: bytes=0-N` header (no header: nothing stored).
fn next_offset(range: Option<&str>) -> Option<u64> {
    match range {
        None => Some(0),
        Some(value) => {
            let (_, last) = value.trim().strip_prefix("bytes=")?.split_once('-')?;
            last.parse::<u64>().ok().map(|n| n + 1)
        }
    }
}

pub struct YouTubePublisher {
    client: Client,
    tokens: Arc<dyn TokenSource>,
    api_base: String,
    chunk_size: usize,
    retry: RetryConfig,
}

impl YouTubePublisher {
    pub fn new(
        config: &PublishConfig,
        tokens: Arc<dyn TokenSource>,
        network: &NetworkConfig,
    ) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(network.timeout_secs))
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
            .build()
            .map_err(PublishError::from_reqwest)?;

        let chunk_size =
            (config.chunk_size / UPLOAD_CHUNK_GRANULARITY).max(1) * UPLOAD_CHUNK_GRANULARITY;

        Ok(Self {
            client,
            tokens,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            chunk_size,
            retry: RetryConfig::from(network),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    async fn open_session(&self, metadata: &VideoMetadata, total: u64) -> Result<String, PublishError> {
        let url = format!("{}/upload/youtube/v3/videos", self.api_base);
        let body = json!({
            "snippet": {
                "title": metadata.title,
                "description": metadata.description,
                "tags": metadata.tags,
                "categoryId": metadata.category_id.to_string(),
            },
            "status": {
                "privacyStatus": metadata.privacy.as_str(),
            },
        });

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header("X-Upload-Content-Type", VIDEO_MIME)
            .header("X-Upload-Content-Length", total.to_string())
            .json(&body)
            .send()
            .await
            .map_err(PublishError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(PublishError::MissingSessionUri)
    }

    async fn send_chunk(
        &self,
        session: &str,
        chunk: Vec<u8>,
        start: u64,
        total: u64,
    ) -> Result<ChunkResponse, PublishError> {
        let end = start + chunk.len() as u64 - 1;
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .put(session)
            .bearer_auth(&token)
            .header(CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, total))
            .body(chunk)
            .send()
            .await
            .map_err(PublishError::from_reqwest)?;

        match response.status() {
            StatusCode::PERMANENT_REDIRECT => {
                let range = response
                    .headers()
                    .get(RANGE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                next_offset(range.as_deref())
                    .map(ChunkResponse::Resume)
                    .ok_or_else(|| {
                        PublishError::InvalidResponse(format!("unparseable Range header {:?}", range))
                    })
            }
            StatusCode::OK | StatusCode::CREATED => {
                let video: VideoResource = response
                    .json()
                    .await
                    .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;
                Ok(ChunkResponse::Done(PublishedVideo::youtube(video.id)))
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(PublishError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

async fn read_chunk(
    file: &mut tokio::fs::File,
    offset: u64,
    len: usize,
) -> Result<Vec<u8>, std::io::Error> {
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf).await?;
    Ok(buf)
}

#[async_trait]
impl Publisher for YouTubePublisher {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn publish(
        &self,
        video: &Path,
        metadata: &VideoMetadata,
    ) -> Result<PublishedVideo, PublishError> {
        let total = tokio::fs::metadata(video).await?.len();
        if total == 0 {
            return Err(PublishError::EmptyVideo(video.display().to_string()));
        }

        let session_uri = with_retry(&self.retry, "youtube.upload.start", || {
            self.open_session(metadata, total)
        })
        .await?;
        debug!("Upload session opened");

        let mut file = tokio::fs::File::open(video).await?;
        let mut offset = 0u64;

        loop {
            let len = (total - offset).min(self.chunk_size as u64) as usize;
            let chunk = read_chunk(&mut file, offset, len).await?;

            let response = with_retry(&self.retry, "youtube.upload.chunk", || {
                self.send_chunk(&session_uri, chunk.clone(), offset, total)
            })
            .await?;

            match response {
                ChunkResponse::Resume(next) => {
                    if next <= offset {
                        return Err(PublishError::InvalidResponse(format!(
                            "upload did not advance past byte {}",
                            offset
                        )));
                    }
                    offset = next.min(total);
                    info!("Uploaded {}%", offset * 100 / total);
                }
                ChunkResponse::Done(published) => {
                    info!("Upload complete. Video ID: {}", published.id);
                    return Ok(published);
                }
            }
        }
    }
}
