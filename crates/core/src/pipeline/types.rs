use serde::Serialize;

use crate::config::{Config, PromptTemplate, PublishConfig, RenderConfig};
use crate::publisher::PublishedVideo;
use crate::queue::QueueColumns;
use crate::renderer::RenderResult;

/// Per-run settings taken from [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub columns: QueueColumns,
    pub prompt: PromptTemplate,
    pub render: RenderConfig,
    pub publish: PublishConfig,
    /// Claim rows before working on them, with this lease.
    pub claim_lease: Option<chrono::Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        let claim = &config.queue.claim;
        Self {
            columns: QueueColumns::from(&config.queue),
            prompt: config.image.prompt.clone(),
            render: config.render.clone(),
            publish: config.publish.clone(),
            claim_lease: claim
                .enabled
                .then(|| chrono::Duration::seconds(claim.lease_secs.min(u32::MAX as u64) as i64)),
        }
    }
}

/// Artifacts of a run that processed a row.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedRun {
    pub run_id: String,
    pub row_index: usize,
    pub quote: String,
    pub image_url: String,
    pub image_path: std::path::PathBuf,
    pub frame_path: std::path::PathBuf,
    pub video: RenderResult,
    /// `None` when publishing is disabled.
    pub published: Option<PublishedVideo>,
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every row is already complete.
    NothingToDo,
    Completed(CompletedRun),
}

impl RunOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NothingToDo => "nothing_to_do",
            Self::Completed(_) => "completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.queue.claim.lease_secs = 60;
        let options = PipelineOptions::from(&config);
        assert_eq!(options.claim_lease, Some(chrono::Duration::seconds(60)));
        assert_eq!(options.columns, QueueColumns::default());

        config.queue.claim.enabled = false;
        assert_eq!(PipelineOptions::from(&config).claim_lease, None);
    }
}
