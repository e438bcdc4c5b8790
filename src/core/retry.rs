//! Retry utility for transient failures in async read-only requests
//!
//! Only idempotent calls go through here. Entry-log writes are never retried.

use std::time::Duration;
use tokio::time::sleep;

/// Configurable retry policy for async operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Build a policy; zero attempts is treated as one
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Execute an async operation, retrying failures up to the policy's attempt count
///
/// Only errors for which `is_transient` returns true are retried; any other
/// error is returned from the attempt that produced it.
///
/// # Examples
/// ```rust
/// use lifthub_checkin::core::retry::{retry_async, RetryPolicy};
/// use std::time::Duration;
///
/// # async fn example() -> Result<String, String> {
/// let result = retry_async(
///     "search_users",
///     RetryPolicy::new(3, Duration::from_millis(200)),
///     |_: &String| true,
///     || async { Ok::<String, String>("ok".to_string()) },
/// )
/// .await?;
/// # Ok(result)
/// # }
/// ```
pub async fn retry_async<F, P, T, E, Fut>(
    operation_name: &str,
    policy: RetryPolicy,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    P: Fn(&E) -> bool,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) if attempt < attempts && is_transient(&error) => {
                log::debug!(
                    "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                    operation_name,
                    attempt,
                    attempts,
                    policy.delay,
                    error
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
