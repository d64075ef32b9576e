//! Retry with exponential back-off and jitter around one pipeline call.
//!
//! The core never retries; batch runs do, for geocoder failures that
//! [`addrscore_core::GeocoderError::is_retryable`] marks transient.

use std::future::Future;
use std::time::Duration;

use addrscore_core::{GeocoderError, MatchError};

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors worth another attempt after a back-off delay.
///
/// Blank input, rejected credentials, and malformed responses are final.
pub(crate) fn is_retriable(err: &MatchError) -> bool {
    match err {
        MatchError::Geocoder(e) => e.is_retryable(),
        MatchError::InvalidInput(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The n-th retry waits `backoff_base_ms * 2^(n-1)` with ±25 % jitter, never
/// less than a provider's `Retry-After`, capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, MatchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MatchError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(attempt, backoff_base_ms, &err);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient geocoder error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

fn backoff_delay_ms(attempt: u32, backoff_base_ms: u64, err: &MatchError) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt.saturating_sub(1)).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed.min(MAX_DELAY_MS) as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    let floor_ms = match err {
        MatchError::Geocoder(GeocoderError::RateLimited {
            retry_after_secs: Some(secs),
        }) => secs.saturating_mul(1000),
        _ => 0,
    };
    jittered.max(floor_ms).min(MAX_DELAY_MS)
}
