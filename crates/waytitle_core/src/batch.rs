use crate::outcome::SENTINEL;

/// One scheduled cell write. `row` and `col` are 1-based spreadsheet
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub row: u32,
    pub col: u32,
    pub value: String,
}

/// First empty column of a row: one past the existing cells, column 1 for an
/// empty row. Successive runs therefore append a fresh results column rather
/// than overwrite a previous run's.
pub fn first_empty_column(row: &[String]) -> u32 {
    row.len() as u32 + 1
}

/// Ordered accumulation of cell writes for the active worksheet.
///
/// Pure state machine: it decides *when* a flush is due; issuing the write is
/// the IO layer's job. The batch is always drained through [`take`], so a
/// flush decision point never leaves more than `batch_size` updates pending.
///
/// [`take`]: PendingBatch::take
#[derive(Debug, Default)]
pub struct PendingBatch {
    updates: Vec<CellUpdate>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, update: CellUpdate) {
        self.updates.push(update);
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// A flush is due when the batch reached `batch_size` or the current row
    /// is the worksheet's last. An empty batch is never due.
    pub fn is_due(&self, batch_size: usize, is_last_row: bool) -> bool {
        !self.updates.is_empty() && (self.updates.len() >= batch_size || is_last_row)
    }

    /// Drain the pending updates, leaving the batch empty.
    pub fn take(&mut self) -> Vec<CellUpdate> {
        std::mem::take(&mut self.updates)
    }
}

/// Rewrite every update's value to the sentinel, for the best-effort write
/// after a flush has exhausted its retries. The spreadsheet then shows either
/// a true result or the sentinel, never a stale value posing as fresh.
pub fn degrade(updates: Vec<CellUpdate>) -> Vec<CellUpdate> {
    updates
        .into_iter()
        .map(|update| CellUpdate {
            value: SENTINEL.to_string(),
            ..update
        })
        .collect()
}
