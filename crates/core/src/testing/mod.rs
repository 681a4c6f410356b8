//! Testing utilities and mock implementations of every external seam.
//!
//! Each mock records what it was asked to do so tests can assert on call
//! order and arguments, and can be told to fail its next call.
//!
//! # Example
//!
//! ```rust,ignore
//! use quotereel_core::testing::{fixtures, MemoryQueue, MockCompositor, MockImageGenerator,
//!     MockRenderer};
//!
//! let queue = Arc::new(MemoryQueue::from_rows(fixtures::queue_rows(&[
//!     ("Be here now", "complete"),
//!     ("Memento mori", ""),
//! ])));
//! let pipeline = QuotePipeline::new(queue.clone(), images, compositor, renderer, options);
//! pipeline.run().await?;
//! assert_eq!(queue.value(3, 2), "Complete");
//! ```

mod memory_queue;
mod mock_compositor;
mod mock_image_generator;
mod mock_publisher;
mod mock_renderer;

pub use memory_queue::{MemoryQueue, RecordedUpdate};
pub use mock_compositor::{MockCompositor, RecordedComposite};
pub use mock_image_generator::MockImageGenerator;
pub use mock_publisher::{MockPublisher, RecordedPublish};
pub use mock_renderer::MockRenderer;

/// Test fixtures and helper functions.
pub mod fixtures {
    /// A queue with a `Quote`/`Status` header followed by `(quote, status)` rows.
    pub fn queue_rows(rows: &[(&str, &str)]) -> Vec<Vec<String>> {
        std::iter::once(vec!["Quote".to_string(), "Status".to_string()])
            .chain(
                rows.iter()
                    .map(|(quote, status)| vec![quote.to_string(), status.to_string()]),
            )
            .collect()
    }

    /// A row with the given cells.
    pub fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }
}
