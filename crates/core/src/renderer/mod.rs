//! Video rendering from a still frame plus an audio clip.
//!
//! The composited frame is looped for a fixed duration, scaled to the target
//! height with aspect ratio preserved, optionally faded in and out, and muxed
//! with the first seconds of the audio asset. Encoding is delegated to the
//! `ffmpeg` binary; the result is probed with `ffprobe` and checked against
//! the [`RenderContract`].

mod error;
mod ffmpeg;
mod traits;
mod types;

pub use error::RenderError;
pub use ffmpeg::FfmpegRenderer;
pub use traits::Renderer;
pub use types::{MediaInfo, RenderContract, RenderJob, RenderResult};
