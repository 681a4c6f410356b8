use thiserror::Error;

use crate::compositor::CompositeError;
use crate::image_gen::ImageGenError;
use crate::publisher::PublishError;
use crate::queue::QueueError;
use crate::renderer::RenderError;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Image generation failed: {0}")]
    Image(#[from] ImageGenError),

    #[error("Compositing failed: {0}")]
    Composite(#[from] CompositeError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Publishing failed: {0}")]
    Publish(#[from] PublishError),

    /// The video was produced but the row could not be marked complete.
    #[error("Failed to mark row {row} complete: {source}")]
    WriteBack {
        row: usize,
        #[source]
        source: QueueError,
    },
}

impl PipelineError {
    /// Stage the run failed in, for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Queue(_) => "queue",
            Self::Image(_) => "image",
            Self::Composite(_) => "composite",
            Self::Render(_) => "render",
            Self::Publish(_) => "publish",
            Self::WriteBack { .. } => "write_back",
        }
    }

    /// Whether the failure points at configuration (bad headers, wrong
    /// spreadsheet) rather than a runtime fault.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Queue(e) if e.is_configuration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        let err = PipelineError::WriteBack {
            row: 3,
            source: QueueError::Timeout,
        };
        assert_eq!(err.stage(), "write_back");
        assert!(err.to_string().contains("row 3"));

        let err: PipelineError = QueueError::MissingColumn {
            column: "Status".to_string(),
        }
        .into();
        assert_eq!(err.stage(), "queue");
        assert!(err.is_configuration());
    }
}
