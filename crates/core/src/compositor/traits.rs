use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::CompositeError;

/// Draws the quote onto a source image and writes the composited frame.
#[async_trait]
pub trait Compositor: Send + Sync {
    fn name(&self) -> &str;

    /// Composite `quote` onto `image`; returns the frame path.
    async fn composite(&self, image: &Path, quote: &str) -> Result<PathBuf, CompositeError>;
}
