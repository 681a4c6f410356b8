//! Spreadsheet-backed work queue.
//!
//! Rows below the header are quotes waiting for a video. A run selects the
//! first row whose `Status` is not `complete`, optionally claims it with a
//! lease marker, and finally writes `Complete` back into the same cell.
//!
//! # Example
//!
//! ```ignore
//! use quotereel_core::queue::{QueueReader, QueueWriter, QueueColumns};
//!
//! let reader = QueueReader::new(backend.clone(), QueueColumns::default());
//! if let Some(row) = reader.select_next(Utc::now()).await? {
//!     // ... produce the video ...
//!     QueueWriter::new(backend).mark_complete(&row).await?;
//! }
//! ```

mod claim;
mod error;
mod reader;
mod sheets;
mod traits;
mod types;
mod writer;

pub use claim::Claim;
pub use error::QueueError;
pub use reader::{is_complete, locate_columns, normalize_status, select_first_pending, QueueReader};
pub use sheets::{column_letter, SheetsQueue};
pub use traits::QueueBackend;
pub use types::{ColumnLayout, QueueColumns, SelectedRow, COMPLETE_STATUS};
pub use writer::QueueWriter;
