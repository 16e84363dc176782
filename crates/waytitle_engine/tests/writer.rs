mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use waytitle_core::{CellUpdate, SENTINEL};
use waytitle_engine::{BatchWriter, SheetsError, WriterSettings};

use common::{transport, worksheet, FakeSheets};

fn fast_settings(batch_size: usize, max_retries: u32) -> WriterSettings {
    WriterSettings {
        batch_size,
        max_retries,
        retry_delay: Duration::ZERO,
        quota_delay: Duration::ZERO,
        request_delay: Duration::ZERO,
    }
}

fn update(row: u32, value: &str) -> CellUpdate {
    CellUpdate {
        row,
        col: 2,
        value: value.to_string(),
    }
}

#[tokio::test]
async fn no_flush_below_batch_size_on_a_middle_row() {
    let sheets = FakeSheets::default();
    let ws = worksheet("Sheet1");
    let mut writer = BatchWriter::new(&sheets, &ws, fast_settings(3, 3));

    writer.add(update(2, "a"));
    writer.flush_if_due(false).await;

    assert!(sheets.recorded_batches().is_empty());
    assert_eq!(writer.pending_len(), 1);
}

#[tokio::test]
async fn flush_triggers_exactly_at_batch_size() {
    let sheets = FakeSheets::default();
    let ws = worksheet("Sheet1");
    let mut writer = BatchWriter::new(&sheets, &ws, fast_settings(2, 3));

    writer.add(update(2, "a"));
    writer.flush_if_due(false).await;
    writer.add(update(3, "b"));
    writer.flush_if_due(false).await;

    let batches = sheets.recorded_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    assert_eq!(writer.pending_len(), 0);
}

#[tokio::test]
async fn last_row_flushes_a_partial_batch() {
    let sheets = FakeSheets::default();
    let ws = worksheet("Sheet1");
    let mut writer = BatchWriter::new(&sheets, &ws, fast_settings(5, 3));

    writer.add(update(2, "only"));
    writer.flush_if_due(true).await;

    assert_eq!(sheets.recorded_batches().len(), 1);
    assert_eq!(writer.pending_len(), 0);
}

#[tokio::test]
async fn transient_write_failure_is_retried_within_the_budget() {
    let sheets = FakeSheets::default();
    sheets.script_write_failures([transport(), transport()]);
    let ws = worksheet("Sheet1");
    let mut writer = BatchWriter::new(&sheets, &ws, fast_settings(1, 3));

    writer.add(update(2, "a"));
    writer.flush_if_due(false).await;

    // Two failures then success on the third attempt; the real values land.
    let batches = sheets.recorded_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].value, "a");
}

#[tokio::test]
async fn exhausted_retries_degrade_the_whole_batch_to_the_sentinel() {
    let sheets = FakeSheets::default();
    // Three scripted failures exhaust a budget of three; the fourth call is
    // the best-effort sentinel write and succeeds.
    sheets.script_write_failures([transport(), transport(), transport()]);
    let ws = worksheet("Sheet1");
    let mut writer = BatchWriter::new(&sheets, &ws, fast_settings(2, 3));

    writer.add(update(2, "Real Title A"));
    writer.add(update(3, "Real Title B"));
    writer.flush_if_due(false).await;

    let batches = sheets.recorded_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    for cell in &batches[0] {
        assert_eq!(cell.value, SENTINEL);
    }
    assert_eq!(writer.pending_len(), 0);
}

#[tokio::test]
async fn batch_is_cleared_even_when_the_sentinel_write_fails_too() {
    let sheets = FakeSheets::default();
    sheets.script_write_failures([transport(), transport(), transport(), transport()]);
    let ws = worksheet("Sheet1");
    let mut writer = BatchWriter::new(&sheets, &ws, fast_settings(1, 3));

    writer.add(update(2, "a"));
    writer.flush_if_due(false).await;

    assert!(sheets.recorded_batches().is_empty());
    assert_eq!(writer.pending_len(), 0);

    // The writer keeps working for subsequent rows.
    writer.add(update(3, "b"));
    writer.flush_if_due(false).await;
    assert_eq!(sheets.recorded_batches().len(), 1);
}

#[tokio::test]
async fn non_transient_failure_degrades_without_retrying() {
    let sheets = FakeSheets::default();
    sheets.script_write_failures([SheetsError::Data("response made no sense".to_string())]);
    let ws = worksheet("Sheet1");
    let mut writer = BatchWriter::new(&sheets, &ws, fast_settings(1, 3));

    writer.add(update(2, "a"));
    writer.flush_if_due(false).await;

    // One failed attempt, then the sentinel write: the scripted queue held a
    // single error, so exactly one recorded batch, already degraded.
    let batches = sheets.recorded_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].value, SENTINEL);
}

#[tokio::test]
async fn quota_failure_is_retried_like_any_transient_error() {
    let sheets = FakeSheets::default();
    sheets.script_write_failures([SheetsError::Quota]);
    let ws = worksheet("Sheet1");
    let mut writer = BatchWriter::new(&sheets, &ws, fast_settings(1, 3));

    writer.add(update(2, "a"));
    writer.flush_if_due(false).await;

    let batches = sheets.recorded_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].value, "a");
}
