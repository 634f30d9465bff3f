use crate::types::DeployerError;
use std::future::Future;
use std::time::Duration;

/// Wait at most `bound` for `operation` to finish.
///
/// On timeout the in-flight future is dropped, so nothing further is polled
/// locally. A transaction that was already broadcast stays broadcast: the
/// remote side may still include it after this returns `Timeout`.
pub async fn with_timeout<T, F>(
    operation: &'static str,
    bound: Duration,
    future: F,
) -> Result<T, DeployerError>
where
    F: Future<Output = Result<T, DeployerError>>,
{
    match tokio::time::timeout(bound, future).await {
        Ok(result) => result,
        Err(_) => Err(DeployerError::Timeout {
            operation,
            after_ms: bound.as_millis() as u64,
        }),
    }
}
