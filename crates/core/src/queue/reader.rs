//! First-pending-row selection.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::claim::Claim;
use super::error::QueueError;
use super::traits::QueueBackend;
use super::types::{ColumnLayout, QueueColumns, SelectedRow};

/// Trimmed, lower-cased status value.
pub fn normalize_status(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether a status cell marks the row as done.
pub fn is_complete(raw: &str) -> bool {
    normalize_status(raw) == "complete"
}

/// Find the status and quote columns by exact header name.
pub fn locate_columns(header: &[String], columns: &QueueColumns) -> Result<ColumnLayout, QueueError> {
    let position = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .map(|i| i + 1)
            .ok_or_else(|| QueueError::MissingColumn {
                column: name.to_string(),
            })
    };

    Ok(ColumnLayout {
        status_col: position(&columns.status)?,
        quote_col: position(&columns.quote)?,
    })
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col - 1).map(String::as_str).unwrap_or("")
}

/// Pick the first data row (header excluded) whose status is not complete.
///
/// `skip` can exclude otherwise eligible rows by their raw status (used to
/// step over live claims). Scanning stops at the first match.
pub fn select_first_pending<F>(
    rows: &[Vec<String>],
    layout: ColumnLayout,
    skip: F,
) -> Option<SelectedRow>
where
    F: Fn(&str) -> bool,
{
    rows.iter()
        .enumerate()
        .skip(1)
        .find_map(|(i, row)| {
            let status = cell(row, layout.status_col);
            if is_complete(status) || skip(status) {
                return None;
            }
            Some(SelectedRow {
                row_index: i + 1,
                quote: cell(row, layout.quote_col).to_string(),
                status: status.to_string(),
                layout,
            })
        })
}

/// Reads the queue and selects the row for this run.
pub struct QueueReader {
    backend: Arc<dyn QueueBackend>,
    columns: QueueColumns,
    lease: Option<Duration>,
}

impl QueueReader {
    pub fn new(backend: Arc<dyn QueueBackend>, columns: QueueColumns) -> Self {
        Self {
            backend,
            columns,
            lease: None,
        }
    }

    /// Skip rows holding a claim younger than `lease`.
    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = Some(lease);
        self
    }

    /// Select the first pending row, or `None` when everything is complete.
    ///
    /// The header is checked before any data row is read; a missing column
    /// fails without scanning.
    pub async fn select_next(&self, now: DateTime<Utc>) -> Result<Option<SelectedRow>, QueueError> {
        let header = self.backend.row_values(1).await?;
        let layout = locate_columns(&header, &self.columns)?;
        debug!(
            status_col = layout.status_col,
            quote_col = layout.quote_col,
            "Located queue columns"
        );

        let rows = self.backend.all_values().await?;
        let lease = self.lease;
        let selected = select_first_pending(&rows, layout, |status| {
            lease.is_some_and(|lease| {
                Claim::parse(status).is_some_and(|claim| {
                    let live = claim.is_live(now, lease);
                    if live {
                        debug!(run_id = %claim.run_id, "Skipping row with live claim");
                    }
                    live
                })
            })
        });

        Ok(selected)
    }
}
