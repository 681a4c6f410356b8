pub mod auth;
pub mod compositor;
pub mod config;
pub mod image_gen;
pub mod metrics;
pub mod pipeline;
pub mod publisher;
pub mod queue;
pub mod renderer;
pub mod retry;
pub mod testing;

pub use auth::{AuthError, InstalledAppTokens, ServiceAccountTokens, StaticToken, TokenSource};
pub use compositor::{CompositeError, Compositor, TextCompositor};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, Credentials,
    SanitizedConfig,
};
pub use image_gen::{ImageGenError, ImageGenerator, ImageRouterClient};
pub use pipeline::{CompletedRun, PipelineError, PipelineOptions, QuotePipeline, RunOutcome};
pub use publisher::{PublishError, PublishedVideo, Publisher, VideoMetadata, YouTubePublisher};
pub use queue::{QueueBackend, QueueError, QueueReader, QueueWriter, SelectedRow, SheetsQueue};
pub use renderer::{FfmpegRenderer, RenderError, RenderJob, RenderResult, Renderer};
