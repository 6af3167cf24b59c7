use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::RetryConfig;

/// Exponential backoff for the startup readiness probe.
pub struct RetryPolicy {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Run `probe` until it succeeds or `max_retries` retries are spent.
    pub async fn run<F, Fut, T, E>(&self, operation: &str, mut probe: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match probe().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(operation, attempts = attempt, "Succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(e) if attempt > self.max_retries => {
                    warn!(operation, attempts = attempt, error = %e, "Giving up");
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Failed, retrying"
                    );
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(self.max_backoff);
                }
            }
        }
    }
}
