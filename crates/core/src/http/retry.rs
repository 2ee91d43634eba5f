//! Retry with exponential backoff for transient HTTP failures.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::metrics;

/// Retry configuration for idempotent requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds; attempt `n` waits `backoff_factor_ms * 2^n`.
    #[serde(default = "default_backoff_factor_ms")]
    pub backoff_factor_ms: u64,

    /// Upper bound for a single delay in seconds.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// Response statuses that trigger a retry.
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_factor_ms() -> u64 {
    500
}

fn default_max_backoff_secs() -> u64 {
    120
}

fn default_retry_statuses() -> Vec<u16> {
    vec![500, 502, 503, 504]
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_factor_ms: default_backoff_factor_ms(),
            max_backoff_secs: default_max_backoff_secs(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let millis = self.backoff_factor_ms.saturating_mul(factor);
        Duration::from_millis(millis).min(Duration::from_secs(self.max_backoff_secs))
    }

    /// Whether a response status is worth retrying.
    pub fn is_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    fn is_retry_error(&self, error: &reqwest::Error) -> bool {
        error.is_connect() || error.is_timeout()
    }
}

/// Send a request, rebuilding it for every attempt.
///
/// Retries on the configured statuses and on connect/timeout errors. Once
/// retries are exhausted the last response (or error) is returned as is, so
/// the caller decides what a non-success status means.
pub async fn send_with_retry<F>(
    policy: &RetryPolicy,
    target: &str,
    mut build: F,
) -> Result<Response, reqwest::Error>
where
    F: FnMut() -> RequestBuilder,
{
    let mut attempt = 0;

    loop {
        let result = build().send().await;
        let retry = attempt < policy.max_retries
            && match &result {
                Ok(response) => policy.is_retry_status(response.status()),
                Err(e) => policy.is_retry_error(e),
            };

        if !retry {
            return result;
        }

        let delay = policy.delay_for(attempt);
        match &result {
            Ok(response) => warn!(
                target_name = target,
                status = response.status().as_u16(),
                attempt = attempt + 1,
                "Transient HTTP status, retrying in {:?}",
                delay
            ),
            Err(e) => warn!(
                target_name = target,
                attempt = attempt + 1,
                "HTTP request failed ({}), retrying in {:?}",
                e,
                delay
            ),
        }
        metrics::HTTP_RETRIES.with_label_values(&[target]).inc();

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
