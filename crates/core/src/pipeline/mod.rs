//! One end-to-end run: select a row, produce the video, mark it complete.

mod error;
mod runner;
mod types;

pub use error::PipelineError;
pub use runner::QuotePipeline;
pub use types::{CompletedRun, PipelineOptions, RunOutcome};
