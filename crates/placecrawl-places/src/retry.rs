//! Caller-side retry with exponential back-off and jitter.
//!
//! The client itself never retries. The pagination driver and the detail
//! fetcher wrap each single call in [`retry_with_backoff`], which re-issues
//! that same call on transient errors. Requests are never reordered, and a
//! back-off only ever lengthens the gap before a page request.
//!
//! Every attempt is preceded by a cancellation check, and back-off sleeps
//! race the cancellation token.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::PlacesError;

/// How many extra attempts a transient failure gets, and the base delay.
///
/// The default performs no retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    #[must_use]
    pub fn from_config(config: &placecrawl_core::AppConfig) -> Self {
        Self::new(config.max_retries, config.retry_backoff_base_ms)
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection refused/reset.
/// - HTTP 5xx responses.
/// - Envelope status `UNKNOWN_ERROR`, which the provider documents as
///   "may succeed if you try again".
///
/// **Not retriable:** every other upstream status (including
/// `OVER_QUERY_LIMIT` and `INVALID_REQUEST`), malformed bodies, validation
/// failures and cancellation.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => e.is_timeout() || e.is_connect(),
        PlacesError::HttpStatus { status, .. } => (500..600).contains(status),
        PlacesError::UpstreamRejected { status, .. } => status == "UNKNOWN_ERROR",
        PlacesError::Deserialize { .. }
        | PlacesError::PaginationLimit { .. }
        | PlacesError::Validation(_)
        | PlacesError::InvalidBaseUrl { .. }
        | PlacesError::Cancelled => false,
    }
}

/// Fails with [`PlacesError::Cancelled`] once `cancel` has fired.
pub(crate) fn ensure_active(cancel: &CancellationToken) -> Result<(), PlacesError> {
    if cancel.is_cancelled() {
        return Err(PlacesError::Cancelled);
    }
    Ok(())
}

/// Sleeps for `duration` unless `cancel` fires first.
pub(crate) async fn sleep_or_cancel(
    duration: Duration,
    cancel: &CancellationToken,
) -> Result<(), PlacesError> {
    ensure_active(cancel)?;
    tokio::select! {
        () = cancel.cancelled() => Err(PlacesError::Cancelled),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Runs `operation`, retrying transient failures up to
/// `policy.max_retries` additional times.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Attempt | Sleep before next attempt     |
/// |---------|-------------------------------|
/// | 1       | 1 000 ms × 2⁰ ± 25 % jitter  |
/// | 2       | 1 000 ms × 2¹ ± 25 % jitter  |
/// | 3       | 1 000 ms × 2² ± 25 % jitter  |
///
/// Delay is capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        ensure_active(cancel)?;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "Places API transient error, retrying after back-off"
                );
                sleep_or_cancel(Duration::from_millis(delay_ms), cancel).await?;
            }
        }
    }
}
