//! Types for the renderer module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::RenderError;
use crate::config::RenderConfig;

/// Allowed deviation of the encoded duration, in seconds.
pub const DURATION_TOLERANCE_SECS: f64 = 0.1;
/// Allowed deviation of the encoded frame rate.
pub const FPS_TOLERANCE: f64 = 0.01;

/// Properties every rendered video must have.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderContract {
    pub duration_secs: f64,
    pub fps: u32,
    pub height: u32,
}

impl RenderContract {
    /// Compare probed media against the contract.
    pub fn check(&self, info: &MediaInfo) -> Result<(), RenderError> {
        if (info.duration_secs - self.duration_secs).abs() > DURATION_TOLERANCE_SECS {
            return Err(RenderError::ContractViolation {
                field: "duration",
                expected: format!("{:.2}s", self.duration_secs),
                actual: format!("{:.2}s", info.duration_secs),
            });
        }

        match info.video_fps {
            Some(fps) if (fps - self.fps as f64).abs() <= FPS_TOLERANCE => {}
            other => {
                return Err(RenderError::ContractViolation {
                    field: "frame rate",
                    expected: self.fps.to_string(),
                    actual: other.map_or("none".to_string(), |f| format!("{:.3}", f)),
                })
            }
        }

        if info.video_height != Some(self.height) {
            return Err(RenderError::ContractViolation {
                field: "height",
                expected: self.height.to_string(),
                actual: info
                    .video_height
                    .map_or("none".to_string(), |h| h.to_string()),
            });
        }

        Ok(())
    }
}

/// A single render request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    pub frame_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    pub contract: RenderContract,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_in_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_out_secs: Option<f64>,
}

impl RenderJob {
    /// Job for `frame` using the configured audio, output and timing.
    pub fn from_config(frame: &Path, config: &RenderConfig) -> Self {
        Self {
            frame_path: frame.to_path_buf(),
            audio_path: config.audio_path.clone(),
            output_path: config.output_path.clone(),
            contract: RenderContract {
                duration_secs: config.duration_secs,
                fps: config.fps,
                height: config.height,
            },
            fade_in_secs: config.fade_in_secs.filter(|d| *d > 0.0),
            fade_out_secs: config.fade_out_secs.filter(|d| *d > 0.0),
        }
    }

    /// The `-vf` filter chain: scale, then the optional fades.
    pub fn video_filter(&self) -> String {
        let mut filters = vec![format!("scale=-2:{}", self.contract.height)];
        if let Some(d) = self.fade_in_secs {
            filters.push(format!("fade=t=in:st=0:d={}", d));
        }
        if let Some(d) = self.fade_out_secs {
            let start = (self.contract.duration_secs - d).max(0.0);
            filters.push(format!("fade=t=out:st={}:d={}", start, d));
        }
        filters.join(",")
    }
}

/// Outcome of a successful render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    pub output_path: PathBuf,
    pub size_bytes: u64,
    /// Wall-clock encode time.
    pub elapsed_ms: u64,
    /// Probe of the output, when verification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInfo>,
}

/// Media information from ffprobe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_secs: f64,
    /// Container format (e.g. "mov").
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
}
