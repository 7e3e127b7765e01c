//! Attempt loop shared by the HTTP providers

use crate::LlmError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `op` up to `max_attempts` times, sleeping 1s, 2s, 4s... between
/// attempts. Only transient errors are retried.
pub(crate) async fn with_attempts<F, Fut>(
    max_attempts: u32,
    operation: &str,
    mut op: F,
) -> Result<String, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        match op().await {
            Ok(content) => return Ok(content),
            Err(e) if e.is_transient() && attempts < max_attempts => {
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(
                    operation,
                    attempt = attempts,
                    max_attempts,
                    backoff_ms = delay.as_millis() as u64,
                    error = %e,
                    "LLM call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
