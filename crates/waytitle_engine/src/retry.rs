use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use pipeline_logging::{pipeline_error, pipeline_warn};

/// Run `op` up to `max_attempts` times with a pause between attempts.
///
/// `classify` maps an error to the delay to wait before the next attempt, or
/// `None` when the error is not transient and retrying would be pointless.
/// The last error is returned once the budget is exhausted. Each failed
/// attempt is logged under `label` so the log reads per call site.
pub async fn with_retries<T, E, F, Fut>(
    max_attempts: u32,
    label: &str,
    classify: impl Fn(&E) -> Option<Duration>,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let Some(delay) = classify(&err) else {
                    return Err(err);
                };
                if attempt >= max_attempts {
                    pipeline_error!("{label}: attempt {attempt} failed, giving up: {err}");
                    return Err(err);
                }
                pipeline_warn!(
                    "{label}: attempt {attempt} failed ({err}), retrying in {delay:?}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
