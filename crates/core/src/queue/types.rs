//! Types for the queue module.

use serde::{Deserialize, Serialize};

use crate::config::QueueConfig;

/// Literal written into the status cell once a row is processed.
pub const COMPLETE_STATUS: &str = "Complete";

/// Header names of the columns the queue relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueColumns {
    pub status: String,
    pub quote: String,
}

impl Default for QueueColumns {
    fn default() -> Self {
        Self {
            status: "Status".to_string(),
            quote: "Quote".to_string(),
        }
    }
}

impl From<&QueueConfig> for QueueColumns {
    fn from(config: &QueueConfig) -> Self {
        Self {
            status: config.status_column.clone(),
            quote: config.quote_column.clone(),
        }
    }
}

/// 1-based positions of the located columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub status_col: usize,
    pub quote_col: usize,
}

/// The row chosen for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedRow {
    /// 1-based row index; the header is row 1.
    pub row_index: usize,
    pub quote: String,
    /// Status cell value at selection time.
    pub status: String,
    pub layout: ColumnLayout,
}

impl SelectedRow {
    pub fn status_col(&self) -> usize {
        self.layout.status_col
    }
}
