//! HTTP client construction shared by the remote providers

use std::time::Duration;

/// Build a client whose requests give up after `timeout_secs`
pub(crate) fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
