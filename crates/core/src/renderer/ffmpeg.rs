//! FFmpeg-based renderer implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::error::RenderError;
use super::traits::Renderer;
use super::types::{MediaInfo, RenderJob, RenderResult};
use crate::config::RenderConfig;

/// Lines of ffmpeg diagnostics kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based renderer.
pub struct FfmpegRenderer {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    log_level: String,
    timeout_secs: u64,
    verify_output: bool,
}

impl FfmpegRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            log_level: config.ffmpeg_log_level.clone(),
            timeout_secs: config.timeout_secs,
            verify_output: config.verify_output,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&RenderConfig::default())
    }

    /// Builds the ffmpeg command line for `job`.
    pub fn build_args(&self, job: &RenderJob) -> Vec<String> {
        let fps = job.contract.fps.to_string();
        let duration = job.contract.duration_secs.to_string();

        vec![
            "-y".to_string(),
            // still frame, looped
            "-loop".to_string(),
            "1".to_string(),
            "-framerate".to_string(),
            fps.clone(),
            "-i".to_string(),
            job.frame_path.to_string_lossy().to_string(),
            // audio, trimmed to the clip length
            "-ss".to_string(),
            "0".to_string(),
            "-t".to_string(),
            duration.clone(),
            "-i".to_string(),
            job.audio_path.to_string_lossy().to_string(),
            "-t".to_string(),
            duration,
            "-vf".to_string(),
            job.video_filter(),
            "-r".to_string(),
            fps,
            "-c:v".to_string(),
            "libx264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-loglevel".to_string(),
            self.log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
            job.output_path.to_string_lossy().to_string(),
        ]
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, RenderError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            codec_name: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
            r_frame_rate: Option<String>,
            avg_frame_rate: Option<String>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| RenderError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        let video = probe.streams.iter().find(|s| s.codec_type == "video");
        let audio = probe.streams.iter().find(|s| s.codec_type == "audio");

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes: probe
                .format
                .size
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            duration_secs: probe
                .format
                .duration
                .as_deref()
                .and_then(|d| d.parse().ok())
                .unwrap_or(0.0),
            format: probe
                .format
                .format_name
                .split(',')
                .next()
                .unwrap_or("unknown")
                .to_string(),
            video_codec: video.and_then(|s| s.codec_name.clone()),
            video_width: video.and_then(|s| s.width),
            video_height: video.and_then(|s| s.height),
            video_fps: video.and_then(|s| {
                s.avg_frame_rate
                    .as_deref()
                    .and_then(parse_frame_rate)
                    .or_else(|| s.r_frame_rate.as_deref().and_then(parse_frame_rate))
            }),
            audio_codec: audio.and_then(|s| s.codec_name.clone()),
        })
    }

    fn check_inputs(job: &RenderJob) -> Result<(), RenderError> {
        for path in [&job.frame_path, &job.audio_path] {
            if !path.exists() {
                return Err(RenderError::InputNotFound { path: path.clone() });
            }
        }
        Ok(())
    }

    async fn run_ffmpeg(&self, job: &RenderJob) -> Result<(), RenderError> {
        let args = self.build_args(job);
        debug!("Running {} {}", self.ffmpeg_path.display(), args.join(" "));

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RenderError::FfmpegNotFound {
                        path: self.ffmpeg_path.clone(),
                    }
                } else {
                    RenderError::Io(e)
                }
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RenderError::render_failed("ffmpeg stderr not captured", None))?;
        let duration = job.contract.duration_secs;

        let result = timeout(Duration::from_secs(self.timeout_secs), async {
            let tail = drain_stderr(stderr, duration).await;
            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, Vec<String>), std::io::Error>((status, tail))
        })
        .await;

        match result {
            Ok(Ok((status, _))) if status.success() => Ok(()),
            Ok(Ok((status, tail))) => Err(RenderError::render_failed(
                format!("FFmpeg exited with code: {:?}", status.code()),
                if tail.is_empty() {
                    None
                } else {
                    Some(tail.join("\n"))
                },
            )),
            Ok(Err(e)) => Err(RenderError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                Err(RenderError::Timeout {
                    timeout_secs: self.timeout_secs,
                })
            }
        }
    }
}

/// Read ffmpeg's stderr to EOF, logging `-progress` output and keeping the
/// last diagnostic lines. Lines that are not UTF-8 are decoded lossily.
async fn drain_stderr<R>(stderr: R, duration: f64) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(stderr).split(b'\n');
    let progress_line = Regex::new(r"^[a-z_0-9]+=").ok();
    let time_regex = Regex::new(r"^out_time_ms=(\d+)").ok();

    let mut tail: Vec<String> = Vec::new();
    let mut last_logged = -1i64;

    while let Ok(Some(bytes)) = segments.next_segment().await {
        let decoded = String::from_utf8_lossy(&bytes);
        let line = decoded.trim_end_matches('\r');

        let is_progress = progress_line.as_ref().is_some_and(|re| re.is_match(line));
        if !is_progress {
            if tail.len() == STDERR_TAIL_LINES {
                tail.remove(0);
            }
            tail.push(line.to_string());
            continue;
        }

        // out_time_ms is in microseconds
        let micros = time_regex
            .as_ref()
            .and_then(|re| re.captures(line))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());
        if let Some(micros) = micros {
            let percent = if duration > 0.0 {
                (micros / 1_000_000.0 / duration * 100.0).min(100.0)
            } else {
                0.0
            };
            let bucket = (percent / 10.0) as i64;
            if bucket > last_logged {
                debug!(percent = format!("{:.0}", percent), "Encoding");
                last_logged = bucket;
            }
        }
    }

    tail
}

/// Parse a rate such as `"24/1"` or `"24000/1001"`.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            (den > 0.0 && num > 0.0).then(|| num / den)
        }
        None => rate.parse::<f64>().ok().filter(|r| *r > 0.0),
    }
}

async fn check_binary(path: &Path) -> Result<(), std::io::Error> {
    Command::new(path).arg("-version").output().await.map(|_| ())
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn render(&self, job: RenderJob) -> Result<RenderResult, RenderError> {
        let start = Instant::now();
        Self::check_inputs(&job)?;

        if let Some(parent) = job.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|_| {
                RenderError::OutputDirectoryFailed {
                    path: parent.to_path_buf(),
                }
            })?;
        }

        self.run_ffmpeg(&job).await?;

        let output_meta = tokio::fs::metadata(&job.output_path)
            .await
            .map_err(|_| RenderError::render_failed("Output file not created", None))?;

        let media = if self.verify_output {
            let media = self.probe(&job.output_path).await?;
            job.contract.check(&media)?;
            Some(media)
        } else {
            None
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            elapsed_ms,
            size_bytes = output_meta.len(),
            "Video saved as {}",
            job.output_path.display()
        );

        Ok(RenderResult {
            output_path: job.output_path,
            size_bytes: output_meta.len(),
            elapsed_ms,
            media,
        })
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, RenderError> {
        if !path.exists() {
            return Err(RenderError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RenderError::FfprobeNotFound {
                        path: self.ffprobe_path.clone(),
                    }
                } else {
                    RenderError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(RenderError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn validate(&self) -> Result<(), RenderError> {
        check_binary(&self.ffmpeg_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::FfmpegNotFound {
                    path: self.ffmpeg_path.clone(),
                }
            } else {
                RenderError::Io(e)
            }
        })?;

        if self.verify_output {
            check_binary(&self.ffprobe_path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RenderError::FfprobeNotFound {
                        path: self.ffprobe_path.clone(),
                    }
                } else {
                    RenderError::Io(e)
                }
            })?;
        }

        Ok(())
    }
}
