//! Retry logic for transport-level failures.

use anyhow::{Result, anyhow};
use log::{debug, warn};
use reqwest::Method;

use crate::config::RetryPolicy;

/// Methods safe to send twice.
fn is_idempotent(method: &Method) -> bool {
    [
        Method::GET,
        Method::HEAD,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]
    .contains(method)
}

/// Whether an error is a transient transport failure worth another attempt.
///
/// A connect failure means the request never left, so any method may retry it.
/// A timeout may follow a request the server already received; only idempotent
/// methods retry those. HTTP statuses never reach here; they are returned as responses.
pub fn is_transient(e: &anyhow::Error, method: &Method) -> bool {
    e.downcast_ref::<reqwest::Error>()
        .is_some_and(|e| e.is_connect() || (e.is_timeout() && is_idempotent(method)))
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or the
/// policy runs out of attempts.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    method: &Method,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let attempts = policy.attempts();
    let mut last_error = None;

    for attempt in 1..=attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_transient(&e, method) {
                    debug!("{}: non-retryable error: {}", operation_name, e);
                    return Err(e);
                }

                if attempt < attempts {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                        operation_name,
                        attempt,
                        attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| anyhow!("{}: failed after {} attempts", operation_name, attempts)))
}
