use pipeline_logging::{pipeline_info, pipeline_warn};
use waytitle_core::{select_capture, TitleOutcome};

use crate::archive::{ArchiveClient, ArchiveError};
use crate::decode::{decode_html, DecodeError};
use crate::extract::extract_title;

/// Resolves one domain to a single [`TitleOutcome`].
///
/// This is the classification boundary: whatever goes wrong underneath
/// (archive transport, response shape, decoding, a title-less page) is
/// converted into exactly one outcome here. `resolve` never returns an error
/// and performs no retries of its own; the archive client has already spent
/// its budget.
pub struct TitleResolver {
    archive: ArchiveClient,
}

impl TitleResolver {
    pub fn new(archive: ArchiveClient) -> Self {
        Self { archive }
    }

    pub async fn resolve(&self, domain: &str) -> TitleOutcome {
        match self.try_resolve(domain).await {
            Ok(outcome) => outcome,
            Err(err) => {
                pipeline_warn!("{domain}: resolution failed: {err}");
                classify(err)
            }
        }
    }

    async fn try_resolve(&self, domain: &str) -> Result<TitleOutcome, ResolveError> {
        let window = self.archive.query_recent_snapshots(domain).await?;
        let Some(capture) = select_capture(&window) else {
            pipeline_info!("{domain}: no snapshots available");
            return Ok(TitleOutcome::NoSnapshot);
        };

        let snapshot = self.archive.fetch_snapshot(domain, &capture.timestamp).await?;
        let decoded = decode_html(&snapshot.bytes, snapshot.content_type.as_deref())?;

        match extract_title(&decoded.html) {
            Some(title) => {
                pipeline_info!("{domain}: found title: {title}");
                Ok(TitleOutcome::Title(title))
            }
            None => {
                pipeline_warn!(
                    "{domain}: no <title> in snapshot {}",
                    capture.timestamp
                );
                Ok(TitleOutcome::ExtractionFailed {
                    timestamp: capture.timestamp.clone(),
                })
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ResolveError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

fn classify(err: ResolveError) -> TitleOutcome {
    match err {
        ResolveError::Archive(ArchiveError::Data(detail)) => TitleOutcome::DataError(detail),
        ResolveError::Archive(archive_err) => TitleOutcome::FetchError(archive_err.to_string()),
        ResolveError::Decode(decode_err) => TitleOutcome::DataError(decode_err.to_string()),
    }
}
