//! Retry policy with exponential backoff, generalized to work without
//! `reqwest` types: a `Generator` call can fail for reasons that have
//! nothing to do with HTTP status codes, so retryability is a closure
//! instead of a status-code table.

use std::future::Future;
use std::time::Duration;

/// Retry configuration, with SDK-aligned defaults.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries (not counting the initial attempt).
    pub max_retries: u32,
    /// Initial backoff delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum backoff delay.
    pub max_delay: Duration,
    /// Jitter factor for down-jitter (0.25 = up to 25% reduction).
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_factor: 0.25,
        }
    }
}

/// Exponential backoff with down-jitter.
///
/// `backoff_step`: 0 before the first retry, 1 before the second, etc.
#[must_use]
pub fn calculate_retry_delay(backoff_step: u32, config: &RetryConfig) -> Duration {
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(backoff_step as i32);
    let capped = base.min(config.max_delay.as_secs_f64());
    let jitter = 1.0 - rand::random::<f64>() * config.jitter_factor;
    Duration::from_secs_f64(capped * jitter)
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Success(T),
    /// Failed after exhausting all retries.
    ExhaustedRetries { attempts: u32, source: E },
    /// Failed on the first attempt with an error the caller marked non-retryable.
    NonRetryable(E),
}

impl<T, E> RetryOutcome<T, E> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Retry `attempt` up to `config.max_retries` times, sleeping between
/// attempts per [`calculate_retry_delay`]. `is_retryable` decides whether a
/// given error is worth retrying; non-retryable errors return immediately.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut attempt: F,
    config: &RetryConfig,
    is_retryable: impl Fn(&E) -> bool,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    for retry_count in 0..config.max_retries {
        match attempt(retry_count).await {
            Ok(value) => return RetryOutcome::Success(value),
            Err(e) if is_retryable(&e) => {
                let delay = calculate_retry_delay(retry_count, config);
                tracing::debug!(
                    retry_count = retry_count + 1,
                    delay_ms = delay.as_millis(),
                    "retrying generator call"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return if retry_count == 0 {
                    RetryOutcome::NonRetryable(e)
                } else {
                    RetryOutcome::ExhaustedRetries {
                        attempts: retry_count + 1,
                        source: e,
                    }
                };
            }
        }
    }

    match attempt(config.max_retries).await {
        Ok(value) => RetryOutcome::Success(value),
        Err(e) => RetryOutcome::ExhaustedRetries {
            attempts: config.max_retries + 1,
            source: e,
        },
    }
}
