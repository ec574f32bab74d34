//! Integration tests for resilience patterns

use museu_resilience::{retry_async, with_timeout, ResilienceError, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_retry_each_attempt_under_timeout() {
    let policy = RetryPolicy::new(3).with_initial_delay(Duration::from_millis(1));
    let calls = AtomicUsize::new(0);

    // first attempt stalls, second one answers
    let result = retry_async(
        &policy,
        |e: &ResilienceError| matches!(e, ResilienceError::Timeout(_)),
        || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            with_timeout(Duration::from_millis(50), async move {
                if n == 0 {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
                "ok"
            })
        },
    )
    .await;

    assert_eq!(result, Ok("ok"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_surfaces_after_retries_exhausted() {
    let policy = RetryPolicy::new(2).with_initial_delay(Duration::from_millis(1));
    let result = retry_async(&policy, |_| true, || {
        with_timeout(Duration::from_millis(10), std::future::pending::<()>())
    })
    .await;

    assert_eq!(result, Err(ResilienceError::Timeout(Duration::from_millis(10))));
}
