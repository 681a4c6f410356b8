//! Optional upload of the rendered video.
//!
//! The pipeline only builds a publisher when upload credentials are
//! configured; without one the publish stage is skipped with a warning.

mod error;
mod traits;
mod types;
mod youtube;

pub use error::PublishError;
pub use traits::Publisher;
pub use types::{PublishedVideo, VideoMetadata};
pub use youtube::{YouTubePublisher, UPLOAD_CHUNK_GRANULARITY};
