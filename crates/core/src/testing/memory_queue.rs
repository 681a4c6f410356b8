//! In-memory queue backend.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::queue::{QueueBackend, QueueError};

/// A recorded cell write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

/// Spreadsheet stand-in holding rows in memory.
///
/// Rows are stored as given, so short rows behave like the real API
/// trimming trailing blanks.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    rows: Mutex<Vec<Vec<String>>>,
    updates: Mutex<Vec<RecordedUpdate>>,
    row_reads: AtomicUsize,
    full_reads: AtomicUsize,
    cell_reads: AtomicUsize,
    fail_updates: AtomicBool,
    fail_reads: AtomicBool,
    /// Cell overwritten right after our own write, as a competing run would.
    interference: Mutex<Option<RecordedUpdate>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// Current value of a cell (empty when out of range).
    pub fn value(&self, row: usize, col: usize) -> String {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        cell_of(&rows, row, col)
    }

    /// Snapshot of every row.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Every write, in order.
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of single-row reads (header lookups).
    pub fn row_reads(&self) -> usize {
        self.row_reads.load(Ordering::SeqCst)
    }

    /// Number of whole-sheet reads.
    pub fn full_reads(&self) -> usize {
        self.full_reads.load(Ordering::SeqCst)
    }

    pub fn cell_reads(&self) -> usize {
        self.cell_reads.load(Ordering::SeqCst)
    }

    /// Make every write fail with a server error.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Make every read fail with a server error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// After the next write to `(row, col)`, replace the cell with `value`.
    pub fn overwrite_after_update(&self, row: usize, col: usize, value: &str) {
        *self.interference.lock().unwrap_or_else(|e| e.into_inner()) = Some(RecordedUpdate {
            row,
            col,
            value: value.to_string(),
        });
    }

    fn check_reads(&self) -> Result<(), QueueError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(QueueError::Api {
                status: 500,
                message: "simulated read failure".to_string(),
            });
        }
        Ok(())
    }
}

fn cell_of(rows: &[Vec<String>], row: usize, col: usize) -> String {
    row.checked_sub(1)
        .and_then(|r| rows.get(r))
        .and_then(|cells| col.checked_sub(1).and_then(|c| cells.get(c)))
        .cloned()
        .unwrap_or_default()
}

fn set_cell(rows: &mut Vec<Vec<String>>, row: usize, col: usize, value: &str) {
    if rows.len() < row {
        rows.resize(row, Vec::new());
    }
    let cells = &mut rows[row - 1];
    if cells.len() < col {
        cells.resize(col, String::new());
    }
    cells[col - 1] = value.to_string();
}

#[async_trait]
impl QueueBackend for MemoryQueue {
    fn name(&self) -> &str {
        "memory"
    }

    async fn row_values(&self, row: usize) -> Result<Vec<String>, QueueError> {
        self.row_reads.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(row
            .checked_sub(1)
            .and_then(|r| rows.get(r))
            .cloned()
            .unwrap_or_default())
    }

    async fn all_values(&self) -> Result<Vec<Vec<String>>, QueueError> {
        self.full_reads.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.rows())
    }

    async fn cell(&self, row: usize, col: usize) -> Result<String, QueueError> {
        self.cell_reads.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.value(row, col))
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), QueueError> {
        if row == 0 || col == 0 {
            return Err(QueueError::InvalidIndex { row, col });
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(QueueError::Api {
                status: 500,
                message: "simulated write failure".to_string(),
            });
        }

        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedUpdate {
                row,
                col,
                value: value.to_string(),
            });

        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        set_cell(&mut rows, row, col, value);

        let mut interference = self.interference.lock().unwrap_or_else(|e| e.into_inner());
        if interference
            .as_ref()
            .is_some_and(|i| i.row == row && i.col == col)
        {
            if let Some(other) = interference.take() {
                set_cell(&mut rows, row, col, &other.value);
            }
        }
        Ok(())
    }
}
