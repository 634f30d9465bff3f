use crate::config::GasConfig;
use crate::types::DeployerError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Fixed-cap retry policy applied to every gas estimation call site.
///
/// All errors are treated as retryable until the attempt cap is reached.
/// Between attempts the policy sleeps for a constant `delay`; there is no
/// backoff or jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &GasConfig) -> Self {
        Self::new(
            config.estimate_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run `operation` until it succeeds or the attempt cap is hit.
    ///
    /// The final failure is reported as `EstimationFailed` naming `target`
    /// and the last underlying cause.
    pub async fn run<T, F, Fut>(&self, target: &str, mut operation: F) -> Result<T, DeployerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DeployerError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.attempts => {
                    return Err(DeployerError::EstimationFailed {
                        target: target.to_string(),
                        attempts: self.attempts,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(
                        "Retrying gas estimation for {} ({}/{})... Error: {}",
                        target, attempt, self.attempts, e
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
