// crates/resilience/src/lib.rs
//! Resilience helpers for calls to the Museu Literário backend
//!
//! This module provides:
//! - Async timeouts, so a stalled request can never leave a control disabled
//! - Retry with exponential backoff for idempotent reads
//!
//! # Example
//!
//! ```rust
//! use museu_resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3)
//!     .with_initial_delay(Duration::from_millis(100));
//! assert_eq!(policy.max_attempts(), 3);
//! assert_eq!(
//!     policy.worst_case(Duration::from_secs(10)),
//!     Duration::from_millis(30_300)
//! );
//! ```

mod error;
mod retry;
mod timeout;

pub use error::{ResilienceError, ResilienceResult};
pub use retry::{retry_async, RetryPolicy};
pub use timeout::with_timeout;
