//! Run configuration, loaded once at startup from `waytitle.ron`.
//!
//! There are no CLI flags; behavior is entirely parameterized by this file
//! plus the API token supplied out of band through the environment.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use waytitle_core::RetryPolicy;
use waytitle_engine::{ArchiveSettings, ProcessSettings, SheetsSettings, WriterSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier of the target spreadsheet document.
    pub spreadsheet_id: String,
    /// Name of the environment variable holding the spreadsheet API bearer
    /// token.
    pub api_token_env: String,
    pub sheets_base_url: String,
    pub cdx_base_url: String,
    pub replay_base_url: String,
    /// Pause after each resolved row, throttling the archive service.
    pub wayback_request_delay_secs: u64,
    /// Pause between archive retry attempts.
    pub wayback_retry_delay_secs: u64,
    /// Pause after each successful batch write.
    pub sheets_request_delay_secs: u64,
    /// Pause between spreadsheet retry attempts.
    pub sheets_retry_delay_secs: u64,
    /// Pause after a quota (rate-limit) signal.
    pub quota_delay_secs: u64,
    pub request_timeout_secs: u64,
    /// How many recent captures the index query asks for.
    pub wayback_limit: u32,
    /// Attempts per archive call.
    pub max_retries: u32,
    /// Attempts per spreadsheet call.
    pub sheets_max_retries: u32,
    /// Pending updates per batch write.
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            api_token_env: "WAYTITLE_SHEETS_TOKEN".to_string(),
            sheets_base_url: "https://sheets.googleapis.com".to_string(),
            cdx_base_url: "https://web.archive.org/cdx/search/cdx".to_string(),
            replay_base_url: "https://web.archive.org".to_string(),
            wayback_request_delay_secs: 2,
            wayback_retry_delay_secs: 2,
            sheets_request_delay_secs: 1,
            sheets_retry_delay_secs: 1,
            quota_delay_secs: 60,
            request_timeout_secs: 20,
            wayback_limit: 3,
            max_retries: 3,
            sheets_max_retries: 3,
            batch_size: 5,
        }
    }
}

impl Config {
    pub fn archive_settings(&self) -> ArchiveSettings {
        ArchiveSettings {
            cdx_base_url: self.cdx_base_url.clone(),
            replay_base_url: self.replay_base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            snapshot_limit: self.wayback_limit,
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_secs(self.wayback_retry_delay_secs),
            ),
        }
    }

    pub fn sheets_settings(&self) -> SheetsSettings {
        let mut settings = SheetsSettings::new(self.spreadsheet_id.clone());
        settings.base_url = self.sheets_base_url.clone();
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs);
        settings
    }

    pub fn writer_settings(&self) -> WriterSettings {
        WriterSettings {
            batch_size: self.batch_size,
            max_retries: self.sheets_max_retries,
            retry_delay: Duration::from_secs(self.sheets_retry_delay_secs),
            quota_delay: Duration::from_secs(self.quota_delay_secs),
            request_delay: Duration::from_secs(self.sheets_request_delay_secs),
        }
    }

    pub fn process_settings(&self) -> ProcessSettings {
        ProcessSettings {
            row_delay: Duration::from_secs(self.wayback_request_delay_secs),
            writer: self.writer_settings(),
        }
    }
}

/// Load the configuration from `path`. A missing file falls back to the
/// defaults; a file that exists but does not parse is an error.
pub fn load(path: &Path) -> Result<Config> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Config::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("could not read config file {path:?}"));
        }
    };

    ron::from_str(&content).with_context(|| format!("could not parse config file {path:?}"))
}
