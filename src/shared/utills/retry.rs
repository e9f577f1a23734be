//! Bounded retry with backoff
//!
//! Used by the catalog client for its single retry on transient transport
//! errors. Anything `should_retry` rejects is returned immediately.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Maximum delay between retries (cap).
    pub max_delay: Duration,
}

impl RetryConfig {
    /// One attempt plus at most one retry after `delay`.
    pub fn single_retry(delay: Duration) -> Self {
        Self {
            max_attempts: 2,
            initial_delay: delay,
            backoff_multiplier: 1.0,
            max_delay: delay,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::single_retry(Duration::ZERO)
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::single_retry(Duration::from_millis(100))
    }
}

/// Execute an async operation, retrying failures `should_retry` accepts.
///
/// # Example
/// ```ignore
/// let course = retry_with_backoff(
///     RetryConfig::single_retry(Duration::from_millis(100)),
///     || client.fetch_once(course_id),
///     LookupFailure::is_transient,
///     "catalog_lookup",
/// ).await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if attempt >= max_attempts || !should_retry(&err) {
            warn!(
                operation = operation_name,
                attempt,
                max_attempts,
                error = %err,
                "Operation failed"
            );
            return Err(err);
        }

        warn!(
            operation = operation_name,
            attempt,
            max_attempts,
            error = %err,
            retry_in_ms = delay.as_millis() as u64,
            "Transient failure, retrying"
        );

        tokio::time::sleep(delay).await;
        delay = Duration::from_secs_f64(
            (delay.as_secs_f64() * config.backoff_multiplier).min(config.max_delay.as_secs_f64()),
        );
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_failure_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, String> = retry_with_backoff(
            RetryConfig::single_retry(Duration::from_millis(1)),
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 1 {
                    Err("reset".to_string())
                } else {
                    Ok(n)
                }
            },
            |_| true,
            "test",
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), String> = retry_with_backoff(
            RetryConfig::single_retry(Duration::from_millis(1)),
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down".to_string())
            },
            |_| true,
            "test",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), String> = retry_with_backoff(
            RetryConfig::default(),
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("not found".to_string())
            },
            |_| false,
            "test",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
