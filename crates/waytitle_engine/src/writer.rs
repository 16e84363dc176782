use std::time::Duration;

use pipeline_logging::{pipeline_error, pipeline_info};
use waytitle_core::{degrade, CellUpdate, PendingBatch};

use crate::retry::with_retries;
use crate::sheets::{SheetsClient, SheetsError, Worksheet};

#[derive(Debug, Clone)]
pub struct WriterSettings {
    /// Flush threshold for the pending batch.
    pub batch_size: usize,
    /// Attempts per flush, including the first.
    pub max_retries: u32,
    /// Pause between ordinary retry attempts.
    pub retry_delay: Duration,
    /// Longer pause used when the API signals quota exhaustion.
    pub quota_delay: Duration,
    /// Pacing pause after a successful flush.
    pub request_delay: Duration,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            batch_size: 5,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            quota_delay: Duration::from_secs(60),
            request_delay: Duration::from_secs(1),
        }
    }
}

/// Accumulates per-row cell updates for one worksheet and persists them in
/// bounded batches.
///
/// A flush that exhausts its retry budget degrades instead of failing the
/// run: every pending value is rewritten to the sentinel and written in one
/// final best-effort attempt, and the batch is cleared either way. The row
/// loop therefore always continues, and a cell is never left holding a stale
/// previous-run value where this run meant to write.
pub struct BatchWriter<'a> {
    client: &'a dyn SheetsClient,
    worksheet: &'a Worksheet,
    pending: PendingBatch,
    settings: WriterSettings,
}

impl<'a> BatchWriter<'a> {
    pub fn new(
        client: &'a dyn SheetsClient,
        worksheet: &'a Worksheet,
        settings: WriterSettings,
    ) -> Self {
        Self {
            client,
            worksheet,
            pending: PendingBatch::new(),
            settings,
        }
    }

    pub fn add(&mut self, update: CellUpdate) {
        self.pending.push(update);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flush when the batch reached its size limit or the worksheet is at
    /// its last row; otherwise a no-op.
    pub async fn flush_if_due(&mut self, is_last_row: bool) {
        if !self.pending.is_due(self.settings.batch_size, is_last_row) {
            return;
        }

        let updates = self.pending.take();
        pipeline_info!(
            "writing batch of {} update(s) to worksheet '{}'",
            updates.len(),
            self.worksheet.title
        );

        let client = self.client;
        let worksheet = self.worksheet;
        let settings = &self.settings;
        let updates_ref: &[CellUpdate] = &updates;
        let result = with_retries(
            settings.max_retries,
            "spreadsheet batch write",
            |err: &SheetsError| {
                if !err.is_transient() {
                    return None;
                }
                Some(match err {
                    SheetsError::Quota => settings.quota_delay,
                    _ => settings.retry_delay,
                })
            },
            move || client.batch_update(worksheet, updates_ref),
        )
        .await;

        match result {
            Ok(()) => {
                tokio::time::sleep(settings.request_delay).await;
            }
            Err(err) => {
                pipeline_error!(
                    "batch write to '{}' failed ({err}); degrading {} update(s) to the sentinel",
                    worksheet.title,
                    updates.len()
                );
                let degraded = degrade(updates);
                if let Err(final_err) = client.batch_update(worksheet, &degraded).await {
                    // Best effort only; the batch is already cleared and the
                    // row loop keeps going.
                    pipeline_error!(
                        "sentinel write to '{}' also failed: {final_err}",
                        worksheet.title
                    );
                }
            }
        }
    }
}
