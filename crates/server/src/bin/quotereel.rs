//! Runs the quote pipeline once: the next pending row becomes a video.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::Registry;
use tracing::{debug, error, info, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quotereel_core::auth::YOUTUBE_UPLOAD_SCOPES;
use quotereel_core::{
    metrics, Config, Credentials, FfmpegRenderer, ImageRouterClient, InstalledAppTokens,
    PipelineOptions, QuotePipeline, Renderer, RunOutcome, ServiceAccountTokens, SheetsQueue,
    TextCompositor, TokenSource, YouTubePublisher,
};
use quotereel_server::{load_settings, metrics::encode_registry};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Errors go to stderr, which `/generate` reports on failure.
    let writer = std::io::stderr
        .with_max_level(Level::ERROR)
        .or_else(std::io::stdout);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(std::io::stdout().is_terminal()),
        )
        .init();

    let config = load_settings()?;
    let credentials = Credentials::resolve(&config).context("Failed to resolve credentials")?;
    let pipeline = build_pipeline(&config, &credentials).await?;

    let outcome = pipeline.run().await.context("Pipeline run failed")?;
    match &outcome {
        RunOutcome::NothingToDo => {}
        RunOutcome::Completed(run) => {
            info!(
                "Row {} done: video {:?} ({} bytes, {} ms)",
                run.row_index, run.video.output_path, run.video.size_bytes, run.video.elapsed_ms
            );
            if let Some(published) = &run.published {
                info!("Published as {}", published.watch_url);
            }
        }
    }

    log_stage_metrics();
    Ok(())
}

async fn build_pipeline(config: &Config, credentials: &Credentials) -> Result<QuotePipeline> {
    let sheet_tokens: Arc<dyn TokenSource> = Arc::new(
        ServiceAccountTokens::from_json(&credentials.queue_service_account)
            .context("Invalid queue service account")?,
    );
    let queue = SheetsQueue::open(&config.queue, sheet_tokens, &config.network)
        .await
        .context("Failed to open the quote spreadsheet")?;
    info!(
        "Using spreadsheet {} (worksheet {:?})",
        queue.spreadsheet_id(),
        queue.sheet_title()
    );

    let images = ImageRouterClient::new(
        &config.image,
        credentials.image_api_key.clone(),
        &config.network,
    )
    .context("Failed to create image client")?;

    let compositor = TextCompositor::new(config.compositor.clone());

    let renderer = FfmpegRenderer::new(&config.render);
    renderer
        .validate()
        .await
        .context("ffmpeg is not available")?;

    let mut pipeline = QuotePipeline::new(
        Arc::new(queue),
        Arc::new(images),
        Arc::new(compositor),
        Arc::new(renderer),
        PipelineOptions::from(config),
    );

    if let Some(secret) = &credentials.upload_client_secret {
        let tokens = InstalledAppTokens::from_json(
            secret,
            config.publish.token_cache.clone(),
            config.publish.flow.clone(),
            YOUTUBE_UPLOAD_SCOPES,
        )
        .context("Invalid upload client secret")?;
        let publisher = YouTubePublisher::new(&config.publish, Arc::new(tokens), &config.network)
            .context("Failed to create upload client")?;
        info!("Upload enabled ({})", config.publish.credentials.describe());
        pipeline = pipeline.with_publisher(Arc::new(publisher));
    }

    Ok(pipeline)
}

/// Dump this run's pipeline metrics at debug level.
fn log_stage_metrics() {
    let registry = Registry::new();
    for metric in metrics::all_metrics() {
        if let Err(e) = registry.register(metric) {
            debug!("Skipping metric: {}", e);
        }
    }
    match encode_registry(&registry) {
        Ok(text) => debug!("Pipeline metrics:\n{}", text),
        Err(e) => debug!("Failed to encode pipeline metrics: {}", e),
    }
}
