//! HTTP transport shared by the pretix and Nextcloud clients.
//!
//! Idempotent requests are retried here and only here, so callers see a
//! request either eventually succeed or fail.

mod retry;

pub use retry::{send_with_retry, RetryPolicy};

use std::time::Duration;

use reqwest::Client;

/// Build the reqwest client used by the API clients.
pub fn build_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("p2n/", env!("CARGO_PKG_VERSION")))
        .build()
}
