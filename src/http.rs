//! # HTTP Client Plumbing
//!
//! Shared client construction and a bounded retry loop used by both the tide
//! and the weather provider. Requests are sent one at a time; the loop only
//! retries failures that are plausibly transient:
//!
//! - transport errors (connect failures, timeouts, resets)
//! - `429 Too Many Requests`
//! - `5xx` server errors
//!
//! Anything else (bad key, unknown station) fails on the first attempt.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while talking to a remote HTTP API.
#[derive(Error, Debug)]
pub enum HttpError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    /// Carries no URL, since query strings may hold API keys.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl HttpError {
    fn is_transient(&self) -> bool {
        match self {
            HttpError::Transport(_) => true,
            HttpError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
        }
    }
}

/// Bounded exponential backoff.
///
/// Attempt `n` (zero based) that fails transiently waits
/// `min(initial_backoff_ms * 2^n, max_backoff_ms)` before the next attempt.
/// At most `max_retries + 1` requests are sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// Policy that sends exactly one request.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Delay to wait after the failed attempt `attempt` (zero based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

/// Build the shared client with a per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("harbour-tides/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send the request produced by `build`, retrying transient failures.
///
/// `build` is called once per attempt because a sent `RequestBuilder` is
/// consumed. `what` names the request in log lines.
pub async fn send_with_retry<F>(
    build: F,
    policy: &RetryPolicy,
    what: &str,
) -> Result<Response, HttpError>
where
    F: Fn() -> RequestBuilder,
{
    let max_attempts = policy.max_retries + 1;
    let mut attempt = 0;

    loop {
        debug!("{what}: attempt {}/{}", attempt + 1, max_attempts);

        let err = match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                HttpError::Status { status, body }
            }
            Err(e) => HttpError::Transport(e.without_url()),
        };

        attempt += 1;
        if !err.is_transient() || attempt >= max_attempts {
            return Err(err);
        }

        let delay = policy.delay_for(attempt - 1);
        warn!(
            "{what}: {err}; retrying in {:.1}s ({attempt}/{})",
            delay.as_secs_f64(),
            policy.max_retries
        );
        tokio::time::sleep(delay).await;
    }
}
