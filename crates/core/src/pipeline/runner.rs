//! Pipeline orchestration.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::error::PipelineError;
use super::types::{CompletedRun, PipelineOptions, RunOutcome};
use crate::compositor::Compositor;
use crate::image_gen::ImageGenerator;
use crate::metrics::{PIPELINE_RUNS, STAGE_DURATION};
use crate::publisher::{Publisher, VideoMetadata};
use crate::queue::{Claim, QueueBackend, QueueReader, QueueWriter};
use crate::renderer::{RenderJob, Renderer};

/// The quote-to-video pipeline.
///
/// Stages run strictly in sequence. A run either ends with the selected row
/// marked `Complete` or aborts with the first error; it never processes more
/// than one row.
pub struct QuotePipeline {
    queue: Arc<dyn QueueBackend>,
    images: Arc<dyn ImageGenerator>,
    compositor: Arc<dyn Compositor>,
    renderer: Arc<dyn Renderer>,
    publisher: Option<Arc<dyn Publisher>>,
    options: PipelineOptions,
}

impl QuotePipeline {
    pub fn new(
        queue: Arc<dyn QueueBackend>,
        images: Arc<dyn ImageGenerator>,
        compositor: Arc<dyn Compositor>,
        renderer: Arc<dyn Renderer>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            queue,
            images,
            compositor,
            renderer,
            publisher: None,
            options,
        }
    }

    /// Enable uploading of the rendered video.
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn publishes(&self) -> bool {
        self.publisher.is_some()
    }

    /// Process the first pending row, if any.
    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        let result = self.run_once().await;
        match &result {
            Ok(outcome) => {
                PIPELINE_RUNS.with_label_values(&[outcome.label()]).inc();
            }
            Err(e) => {
                PIPELINE_RUNS.with_label_values(&["failed"]).inc();
                warn!(stage = e.stage(), "Pipeline run failed: {}", e);
            }
        }
        result
    }

    #[instrument(skip(self), fields(queue = self.queue.name()))]
    async fn run_once(&self) -> Result<RunOutcome, PipelineError> {
        let now = Utc::now();
        let claim = Claim::generate(now);

        let row = {
            let _timer = STAGE_DURATION.with_label_values(&["select"]).start_timer();
            let mut reader = QueueReader::new(self.queue.clone(), self.options.columns.clone());
            if let Some(lease) = self.options.claim_lease {
                reader = reader.with_lease(lease);
            }
            reader.select_next(now).await?
        };

        // A blank quote stops the run the same way an exhausted queue does.
        let Some(row) = row.filter(|row| !row.quote.trim().is_empty()) else {
            info!("All rows are marked complete. Nothing left to process.");
            return Ok(RunOutcome::NothingToDo);
        };
        info!("Quote selected from row {}: {}", row.row_index, row.quote);

        let writer = QueueWriter::new(self.queue.clone());
        if self.options.claim_lease.is_some() {
            writer.claim(&row, &claim).await?;
        }

        let (image_url, image_path) = {
            let _timer = STAGE_DURATION.with_label_values(&["image"]).start_timer();
            let prompt = self.options.prompt.render(&row.quote);
            let url = self.images.generate(&prompt).await?;
            let path = self.images.download(&url).await?;
            (url, path)
        };

        let frame_path = {
            let _timer = STAGE_DURATION.with_label_values(&["composite"]).start_timer();
            self.compositor.composite(&image_path, &row.quote).await?
        };

        let video = {
            let _timer = STAGE_DURATION.with_label_values(&["render"]).start_timer();
            let job = RenderJob::from_config(&frame_path, &self.options.render);
            self.renderer.render(job).await?
        };

        let published = match &self.publisher {
            Some(publisher) => {
                let _timer = STAGE_DURATION.with_label_values(&["publish"]).start_timer();
                let metadata = VideoMetadata::for_quote(&self.options.publish, &row.quote);
                let video = publisher.publish(&video.output_path, &metadata).await?;
                info!("Video URL: {}", video.watch_url);
                Some(video)
            }
            None => {
                warn!("Upload credentials not configured; skipping publish");
                None
            }
        };

        {
            let _timer = STAGE_DURATION.with_label_values(&["write_back"]).start_timer();
            writer
                .mark_complete(&row)
                .await
                .map_err(|source| PipelineError::WriteBack {
                    row: row.row_index,
                    source,
                })?;
        }

        Ok(RunOutcome::Completed(CompletedRun {
            run_id: claim.run_id,
            row_index: row.row_index,
            quote: row.quote,
            image_url,
            image_path,
            frame_path,
            video,
            published,
        }))
    }
}
