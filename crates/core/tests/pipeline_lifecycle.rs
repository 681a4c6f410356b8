//! Pipeline lifecycle integration tests.
//!
//! These tests run the full pipeline against the in-memory queue and mock
//! collaborators:
//! - First-pending-row selection and write-back
//! - Clean exit when everything is complete
//! - Fail-fast on a malformed header
//! - Optional publishing
//! - Claims, blank quotes and write-back failures

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_test::assert_ok;

use quotereel_core::{
    config::PromptTemplate,
    image_gen::ImageGenError,
    pipeline::{PipelineError, PipelineOptions, QuotePipeline, RunOutcome},
    queue::{Claim, QueueError},
    renderer::{MediaInfo, RenderError},
    testing::{fixtures, MemoryQueue, MockCompositor, MockImageGenerator, MockPublisher, MockRenderer},
};

/// Test helper wiring the pipeline to mocks.
struct TestHarness {
    queue: Arc<MemoryQueue>,
    images: Arc<MockImageGenerator>,
    compositor: Arc<MockCompositor>,
    renderer: Arc<MockRenderer>,
    publisher: Arc<MockPublisher>,
}

impl TestHarness {
    fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            queue: Arc::new(MemoryQueue::from_rows(rows)),
            images: Arc::new(MockImageGenerator::new()),
            compositor: Arc::new(MockCompositor::new()),
            renderer: Arc::new(MockRenderer::new()),
            publisher: Arc::new(MockPublisher::new()),
        }
    }

    fn with_statuses(statuses: &[&str]) -> Self {
        let quotes: Vec<String> = (1..=statuses.len()).map(|i| format!("Quote {}", i)).collect();
        let rows: Vec<(&str, &str)> = quotes
            .iter()
            .zip(statuses)
            .map(|(q, s)| (q.as_str(), *s))
            .collect();
        Self::new(fixtures::queue_rows(&rows))
    }

    fn pipeline(&self, options: PipelineOptions) -> QuotePipeline {
        QuotePipeline::new(
            self.queue.clone(),
            self.images.clone(),
            self.compositor.clone(),
            self.renderer.clone(),
            options,
        )
    }

    fn publishing_pipeline(&self, options: PipelineOptions) -> QuotePipeline {
        self.pipeline(options).with_publisher(self.publisher.clone())
    }

    /// Options without claims, so writes are only the final write-back.
    fn plain() -> PipelineOptions {
        PipelineOptions {
            claim_lease: None,
            ..Default::default()
        }
    }

    async fn no_downstream_work(&self) -> bool {
        self.images.call_count().await == 0
            && self.compositor.call_count().await == 0
            && self.renderer.render_count().await == 0
            && self.publisher.upload_count().await == 0
    }
}

#[tokio::test]
async fn test_selects_first_pending_and_completes_only_it() {
    let harness = TestHarness::with_statuses(&["complete", "pending", "complete"]);

    let outcome = assert_ok!(harness.pipeline(TestHarness::plain()).run().await);

    let RunOutcome::Completed(run) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(run.row_index, 3);
    assert_eq!(run.quote, "Quote 2");

    assert_eq!(harness.queue.value(2, 2), "complete");
    assert_eq!(harness.queue.value(3, 2), "Complete");
    assert_eq!(harness.queue.value(4, 2), "complete");

    let updates = harness.queue.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!((updates[0].row, updates[0].col), (3, 2));
}

#[tokio::test]
async fn test_all_complete_is_nothing_to_do() {
    let harness = TestHarness::with_statuses(&[" Complete ", "COMPLETE", "complete"]);

    let outcome = assert_ok!(harness.pipeline(TestHarness::plain()).run().await);

    assert!(matches!(outcome, RunOutcome::NothingToDo));
    assert!(harness.queue.updates().is_empty());
    assert!(harness.no_downstream_work().await);
}

#[tokio::test]
async fn test_header_only_is_nothing_to_do() {
    let harness = TestHarness::new(fixtures::queue_rows(&[]));

    let outcome = assert_ok!(harness.pipeline(PipelineOptions::default()).run().await);

    assert!(matches!(outcome, RunOutcome::NothingToDo));
    assert!(harness.queue.updates().is_empty());
}

#[tokio::test]
async fn test_missing_header_fails_before_any_work() {
    for header in [["Quote", "State"], ["Text", "Status"]] {
        let harness = TestHarness::new(vec![
            fixtures::row(&header),
            fixtures::row(&["Be brave", ""]),
        ]);

        let err = harness
            .pipeline(TestHarness::plain())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Queue(QueueError::MissingColumn { .. })));
        assert!(err.is_configuration());
        assert_eq!(harness.queue.full_reads(), 0);
        assert!(harness.queue.updates().is_empty());
        assert!(harness.no_downstream_work().await);
    }
}

#[tokio::test]
async fn test_columns_located_by_name() {
    let harness = TestHarness::new(vec![
        fixtures::row(&["Author", "Status", "Id", "Quote"]),
        fixtures::row(&["Seneca", "complete", "1", "Luck is preparation"]),
        fixtures::row(&["Epictetus", "", "2", "No man is free"]),
    ]);

    let outcome = assert_ok!(harness.pipeline(TestHarness::plain()).run().await);

    let RunOutcome::Completed(run) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(run.quote, "No man is free");
    assert_eq!(harness.queue.value(3, 2), "Complete");
    assert_eq!(harness.queue.value(3, 4), "No man is free");
}

#[tokio::test]
async fn test_stages_receive_quote_and_artifacts() {
    let harness = TestHarness::with_statuses(&[""]);

    let outcome = assert_ok!(harness.pipeline(TestHarness::plain()).run().await);
    let RunOutcome::Completed(run) = outcome else {
        panic!("expected a completed run");
    };

    let prompts = harness.images.recorded_prompts().await;
    assert_eq!(prompts, vec![PromptTemplate::Vintage.render("Quote 1")]);

    let downloads = harness.images.recorded_downloads().await;
    assert_eq!(downloads, vec![run.image_url.clone()]);

    let composites = harness.compositor.recorded_calls().await;
    assert_eq!(composites.len(), 1);
    assert_eq!(composites[0].image, run.image_path);
    assert_eq!(composites[0].quote, "Quote 1");

    let jobs = harness.renderer.recorded_jobs().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].frame_path, PathBuf::from("quote_image.jpg"));
    assert_eq!(jobs[0].contract.duration_secs, 7.0);
    assert_eq!(jobs[0].contract.fps, 24);
    assert_eq!(jobs[0].contract.height, 1080);

    let media = run.video.media.expect("mock renderer reports media");
    assert_eq!(media.duration_secs, 7.0);
    assert_eq!(media.video_fps, Some(24.0));
    assert_eq!(media.video_height, Some(1080));
}

#[tokio::test]
async fn test_without_publisher_still_completes() {
    let harness = TestHarness::with_statuses(&["pending"]);

    let outcome = assert_ok!(harness.pipeline(TestHarness::plain()).run().await);

    let RunOutcome::Completed(run) = outcome else {
        panic!("expected a completed run");
    };
    assert!(run.published.is_none());
    assert_eq!(harness.publisher.upload_count().await, 0);
    assert_eq!(harness.queue.value(2, 2), "Complete");
}

#[tokio::test]
async fn test_with_publisher_uploads_before_write_back() {
    let harness = TestHarness::with_statuses(&["pending"]);

    let outcome = assert_ok!(
        harness
            .publishing_pipeline(TestHarness::plain())
            .run()
            .await
    );

    let RunOutcome::Completed(run) = outcome else {
        panic!("expected a completed run");
    };
    let published = run.published.expect("video published");
    assert_eq!(published.id, "mock-video-1");

    let uploads = harness.publisher.recorded_uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].video, PathBuf::from("quote_video_with_audio.mp4"));
    assert_eq!(uploads[0].metadata.title, "Stoic Quote of the Day");
    assert!(uploads[0].metadata.description.contains("\"Quote 1\""));
    assert_eq!(harness.queue.value(2, 2), "Complete");
}

#[tokio::test]
async fn test_publish_failure_leaves_row_pending() {
    let harness = TestHarness::with_statuses(&["pending"]);
    harness
        .publisher
        .set_next_error(quotereel_core::PublishError::MissingSessionUri)
        .await;

    let err = harness
        .publishing_pipeline(TestHarness::plain())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "publish");
    assert_eq!(harness.queue.value(2, 2), "pending");
}

#[tokio::test]
async fn test_missing_image_url_aborts_run() {
    let harness = TestHarness::with_statuses(&["", ""]);
    harness
        .images
        .set_next_error(ImageGenError::MissingImageUrl("'data' list is empty".to_string()))
        .await;

    let err = harness
        .pipeline(TestHarness::plain())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Image(ImageGenError::MissingImageUrl(_))));
    assert_eq!(harness.compositor.call_count().await, 0);
    assert_eq!(harness.renderer.render_count().await, 0);
    assert!(harness.queue.updates().is_empty());
}

#[tokio::test]
async fn test_contract_violation_aborts_run() {
    let harness = TestHarness::with_statuses(&[""]);
    harness
        .renderer
        .set_media_override(MediaInfo {
            path: PathBuf::from("quote_video_with_audio.mp4"),
            size_bytes: 1,
            duration_secs: 6.0,
            format: "mov".to_string(),
            video_codec: Some("h264".to_string()),
            video_width: Some(1080),
            video_height: Some(1080),
            video_fps: Some(24.0),
            audio_codec: None,
        })
        .await;

    let err = harness
        .pipeline(TestHarness::plain())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Render(RenderError::ContractViolation { field: "duration", .. })
    ));
    assert!(harness.queue.updates().is_empty());
}

#[tokio::test]
async fn test_write_back_failure_is_fatal() {
    let harness = TestHarness::with_statuses(&["pending"]);
    harness.queue.set_fail_updates(true);

    let err = harness
        .pipeline(TestHarness::plain())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::WriteBack { row: 2, .. }));
    // the video was still produced
    assert_eq!(harness.renderer.render_count().await, 1);
}

#[tokio::test]
async fn test_empty_quote_is_nothing_to_do() {
    let harness = TestHarness::new(fixtures::queue_rows(&[("   ", ""), ("Later", "")]));

    let outcome = assert_ok!(harness.pipeline(PipelineOptions::default()).run().await);

    assert!(matches!(outcome, RunOutcome::NothingToDo));
    assert!(harness.queue.updates().is_empty());
    assert!(harness.no_downstream_work().await);
}

#[tokio::test]
async fn test_empty_quote_after_complete_rows_without_claims() {
    let harness = TestHarness::new(fixtures::queue_rows(&[("a", "complete"), ("", "")]));
    let options = PipelineOptions {
        claim_lease: None,
        ..PipelineOptions::default()
    };

    let outcome = assert_ok!(harness.pipeline(options).run().await);

    assert!(matches!(outcome, RunOutcome::NothingToDo));
    assert!(harness.queue.updates().is_empty());
    assert_eq!(harness.queue.value(3, 2), "");
    assert!(harness.no_downstream_work().await);
}

#[tokio::test]
async fn test_claim_written_before_work_then_completed() {
    let harness = TestHarness::with_statuses(&["pending"]);

    let outcome = assert_ok!(harness.pipeline(PipelineOptions::default()).run().await);
    let RunOutcome::Completed(run) = outcome else {
        panic!("expected a completed run");
    };

    let updates = harness.queue.updates();
    assert_eq!(updates.len(), 2);
    let claim = Claim::parse(&updates[0].value).expect("first write is a claim marker");
    assert_eq!(claim.run_id, run.run_id);
    assert_eq!(updates[1].value, "Complete");
    assert_eq!(harness.queue.value(2, 2), "Complete");
}

#[tokio::test]
async fn test_live_claim_is_skipped() {
    let live = Claim::new("other-run", Utc::now() - Duration::seconds(30)).marker();
    let harness = TestHarness::with_statuses(&[live.as_str(), "pending"]);

    let outcome = assert_ok!(harness.pipeline(PipelineOptions::default()).run().await);
    let RunOutcome::Completed(run) = outcome else {
        panic!("expected a completed run");
    };

    assert_eq!(run.row_index, 3);
    assert_eq!(harness.queue.value(2, 2), live);
}

#[tokio::test]
async fn test_expired_claim_is_reprocessed() {
    let stale = Claim::new("crashed-run", Utc::now() - Duration::hours(3)).marker();
    let harness = TestHarness::with_statuses(&[stale.as_str(), "pending"]);

    let outcome = assert_ok!(harness.pipeline(PipelineOptions::default()).run().await);
    let RunOutcome::Completed(run) = outcome else {
        panic!("expected a completed run");
    };

    assert_eq!(run.row_index, 2);
    assert_eq!(harness.queue.value(2, 2), "Complete");
    assert_eq!(harness.queue.value(3, 2), "pending");
}

#[tokio::test]
async fn test_lost_claim_aborts_before_image_work() {
    let harness = TestHarness::with_statuses(&["pending"]);
    harness
        .queue
        .overwrite_after_update(2, 2, "Processing rival 2024-01-01T00:00:00Z");

    let err = harness
        .pipeline(PipelineOptions::default())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Queue(QueueError::ClaimLost { row: 2, .. })));
    assert!(harness.no_downstream_work().await);
}

#[tokio::test]
async fn test_second_run_moves_to_next_row() {
    let harness = TestHarness::with_statuses(&["", ""]);
    let pipeline = harness.pipeline(PipelineOptions::default());

    let first = assert_ok!(pipeline.run().await);
    let second = assert_ok!(pipeline.run().await);
    let third = assert_ok!(pipeline.run().await);

    assert!(matches!(first, RunOutcome::Completed(ref r) if r.row_index == 2));
    assert!(matches!(second, RunOutcome::Completed(ref r) if r.row_index == 3));
    assert!(matches!(third, RunOutcome::NothingToDo));
}
