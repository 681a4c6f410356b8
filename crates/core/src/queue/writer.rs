//! Status cell mutations: claim and write-back.

use std::sync::Arc;

use tracing::{debug, info};

use super::claim::Claim;
use super::error::QueueError;
use super::traits::QueueBackend;
use super::types::{SelectedRow, COMPLETE_STATUS};

/// Writes status values for the selected row.
pub struct QueueWriter {
    backend: Arc<dyn QueueBackend>,
}

impl QueueWriter {
    pub fn new(backend: Arc<dyn QueueBackend>) -> Self {
        Self { backend }
    }

    /// Reserve the row: write the claim marker and read it back.
    ///
    /// Fails with [`QueueError::ClaimLost`] if the cell holds anything else
    /// afterwards.
    pub async fn claim(&self, row: &SelectedRow, claim: &Claim) -> Result<(), QueueError> {
        let marker = claim.marker();
        self.backend
            .update_cell(row.row_index, row.status_col(), &marker)
            .await?;

        let found = self.backend.cell(row.row_index, row.status_col()).await?;
        if found.trim() != marker {
            return Err(QueueError::ClaimLost {
                row: row.row_index,
                found,
            });
        }

        debug!(row = row.row_index, run_id = %claim.run_id, "Claimed queue row");
        Ok(())
    }

    /// Write `Complete` into the status cell captured at selection time.
    ///
    /// No re-validation happens first: the last writer wins.
    pub async fn mark_complete(&self, row: &SelectedRow) -> Result<(), QueueError> {
        self.backend
            .update_cell(row.row_index, row.status_col(), COMPLETE_STATUS)
            .await?;
        info!("Marked row {} as {}", row.row_index, COMPLETE_STATUS);
        Ok(())
    }
}
