// crates/resilience/src/timeout.rs
//! Timeout handling utilities

use crate::error::{ResilienceError, ResilienceResult};
use std::future::Future;
use std::time::Duration;

/// Runs `operation` to completion or gives up after `duration`
///
/// The future is dropped on expiry, so a late response is never observed.
pub async fn with_timeout<F, T>(duration: Duration, operation: F) -> ResilienceResult<T>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, operation)
        .await
        .map_err(|_| ResilienceError::Timeout(duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_success() {
        let result = with_timeout(Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            42
        })
        .await;

        assert_eq!(result, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_exceeded() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            42
        })
        .await;

        assert_eq!(result, Err(ResilienceError::Timeout(Duration::from_millis(10))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_forever_is_cut_off() {
        let result = with_timeout(Duration::from_secs(10), std::future::pending::<()>()).await;
        assert!(matches!(result, Err(ResilienceError::Timeout(_))));
    }
}
