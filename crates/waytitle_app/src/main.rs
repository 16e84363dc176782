mod config;

use std::path::Path;

use anyhow::{bail, Context, Result};
use pipeline_logging::{pipeline_error, pipeline_info, LogDestination};
use waytitle_engine::{
    with_retries, ArchiveClient, GoogleSheetsClient, SheetProcessor, SheetsClient, SheetsError,
    TitleResolver,
};

const CONFIG_FILE: &str = "waytitle.ron";
const LOG_FILE: &str = "waytitle.log";

#[tokio::main]
async fn main() {
    pipeline_logging::initialize(LogDestination::Both, Path::new(LOG_FILE));
    pipeline_info!("waytitle starting");

    if let Err(err) = run().await {
        pipeline_error!("fatal: {err:#}");
        std::process::exit(1);
    }

    pipeline_info!("waytitle finished");
}

async fn run() -> Result<()> {
    let config = config::load(Path::new(CONFIG_FILE))?;
    if config.spreadsheet_id.is_empty() {
        bail!("spreadsheet_id is not set; put it in {CONFIG_FILE}");
    }

    let token = std::env::var(&config.api_token_env).with_context(|| {
        format!(
            "environment variable {} (spreadsheet API token) is not set",
            config.api_token_env
        )
    })?;

    let sheets = GoogleSheetsClient::new(config.sheets_settings(), token)?;

    // Opening the spreadsheet is the one unrecoverable failure: if the probe
    // exhausts its retries the run terminates with a non-zero status.
    let writer = config.writer_settings();
    let sheets_ref = &sheets;
    let title = with_retries(
        writer.max_retries,
        "open spreadsheet",
        |err: &SheetsError| {
            if !err.is_transient() {
                return None;
            }
            Some(match err {
                SheetsError::Quota => writer.quota_delay,
                _ => writer.retry_delay,
            })
        },
        move || sheets_ref.spreadsheet_title(),
    )
    .await
    .context("could not open the spreadsheet")?;
    pipeline_info!("spreadsheet opened: {title}");

    let archive = ArchiveClient::new(config.archive_settings())?;
    let resolver = TitleResolver::new(archive);
    let processor = SheetProcessor::new(&sheets, &resolver, config.process_settings());

    let summary = processor.run().await.context("run aborted")?;
    pipeline_info!(
        "run complete: {} worksheet(s), {} row(s) processed, {} row(s) skipped",
        summary.worksheets,
        summary.rows_processed,
        summary.rows_skipped
    );
    Ok(())
}
