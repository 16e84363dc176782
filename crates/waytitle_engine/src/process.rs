use std::time::Duration;

use pipeline_logging::{pipeline_error, pipeline_info};
use waytitle_core::{first_empty_column, sanitize_worksheet_title, CellUpdate};

use crate::resolve::TitleResolver;
use crate::retry::with_retries;
use crate::sheets::{SheetsClient, SheetsError, Worksheet};
use crate::writer::{BatchWriter, WriterSettings};

#[derive(Debug, Clone)]
pub struct ProcessSettings {
    /// Pacing pause after each resolved row, throttling the archive service
    /// independently of batch-flush pacing.
    pub row_delay: Duration,
    pub writer: WriterSettings,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            row_delay: Duration::from_secs(2),
            writer: WriterSettings::default(),
        }
    }
}

/// Counters for the final log line of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Worksheets that had data rows and were processed.
    pub worksheets: usize,
    /// Rows with a non-empty domain that produced an outcome.
    pub rows_processed: usize,
    /// Rows skipped for an empty or whitespace-only domain.
    pub rows_skipped: usize,
}

/// Drives the whole run: one worksheet at a time, one row at a time, one
/// outstanding call at a time.
pub struct SheetProcessor<'a> {
    sheets: &'a dyn SheetsClient,
    resolver: &'a TitleResolver,
    settings: ProcessSettings,
}

impl<'a> SheetProcessor<'a> {
    pub fn new(
        sheets: &'a dyn SheetsClient,
        resolver: &'a TitleResolver,
        settings: ProcessSettings,
    ) -> Self {
        Self {
            sheets,
            resolver,
            settings,
        }
    }

    /// Process every worksheet of the spreadsheet. Fails only when the
    /// worksheet listing itself cannot be obtained; everything below that is
    /// absorbed into per-row outcomes or a skipped worksheet.
    pub async fn run(&self) -> Result<RunSummary, SheetsError> {
        let worksheets = self.sheets.list_worksheets().await?;
        let mut summary = RunSummary::default();

        for worksheet in &worksheets {
            let display = sanitize_worksheet_title(&worksheet.title);
            pipeline_info!("processing worksheet: {display}");

            let rows = match self.read_rows_with_retries(worksheet).await {
                Ok(rows) => rows,
                Err(err) => {
                    pipeline_error!("{display}: could not read rows, skipping worksheet: {err}");
                    continue;
                }
            };

            if rows.len() < 2 {
                pipeline_info!("{display}: empty or header-only, skipping");
                continue;
            }
            summary.worksheets += 1;

            let mut writer =
                BatchWriter::new(self.sheets, worksheet, self.settings.writer.clone());
            let row_count = rows.len();

            // Data rows start at spreadsheet row 2; row 1 is the header.
            for (idx, row) in rows.iter().enumerate().skip(1) {
                let row_index = (idx + 1) as u32;
                let is_last_row = idx + 1 == row_count;

                let domain = row.first().map(|cell| cell.trim()).unwrap_or("");
                if domain.is_empty() {
                    pipeline_info!("{display} row {row_index}: empty domain, skipping");
                    summary.rows_skipped += 1;
                    // Updates pending from earlier rows must still flush at
                    // the end of the worksheet.
                    writer.flush_if_due(is_last_row).await;
                    continue;
                }

                pipeline_info!("{display} row {row_index}: processing domain {domain}");
                let outcome = self.resolver.resolve(domain).await;
                let value = outcome.display_value();
                pipeline_info!("{display} row {row_index}: result ready: {value}");

                writer.add(CellUpdate {
                    row: row_index,
                    col: first_empty_column(row),
                    value,
                });
                summary.rows_processed += 1;

                writer.flush_if_due(is_last_row).await;
                tokio::time::sleep(self.settings.row_delay).await;
            }
        }

        Ok(summary)
    }

    async fn read_rows_with_retries(
        &self,
        worksheet: &Worksheet,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let writer = &self.settings.writer;
        let sheets = self.sheets;
        with_retries(
            writer.max_retries,
            "worksheet read",
            |err: &SheetsError| {
                if !err.is_transient() {
                    return None;
                }
                Some(match err {
                    SheetsError::Quota => writer.quota_delay,
                    _ => writer.retry_delay,
                })
            },
            move || sheets.read_rows(worksheet),
        )
        .await
    }
}
