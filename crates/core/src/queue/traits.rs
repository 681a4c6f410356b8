//! Trait definitions for the queue module.

use async_trait::async_trait;

use super::error::QueueError;

/// A tabular store addressed by 1-based row and column indices.
///
/// Rows may come back shorter than the header when trailing cells are
/// empty; callers treat missing cells as empty strings.
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Returns the name of this backend implementation.
    fn name(&self) -> &str;

    /// Values of a single row.
    async fn row_values(&self, row: usize) -> Result<Vec<String>, QueueError>;

    /// Every row of the worksheet, header included.
    async fn all_values(&self) -> Result<Vec<Vec<String>>, QueueError>;

    /// Value of a single cell (empty string when blank).
    async fn cell(&self, row: usize, col: usize) -> Result<String, QueueError>;

    /// Overwrite a single cell.
    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), QueueError>;
}
