//! Bounded retry for read requests.

use std::future::Future;
use std::time::Duration;

use store::config::NetworkConfig;

use crate::error::ApiError;

/// How often and how patiently a read is retried.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub attempts: u32,
    /// Attempt `n` (1-based) is followed by a wait of `n * delay`.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self {
            attempts: config.retry_attempts,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Single attempt.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// `attempts` tries without waiting in between.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            delay: Duration::ZERO,
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or attempts run out.
///
/// Only [`ApiError::is_transient`] failures are retried.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < attempts => {
                tracing::debug!("{what} failed (attempt {attempt}/{attempts}): {e}");
                sleep(policy.delay * attempt).await;
                attempt += 1;
            }
            Err(e) => {
                if attempt > 1 {
                    tracing::warn!("{what} failed after {attempt} attempts: {e}");
                }
                return Err(e);
            }
        }
    }
}

async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}
