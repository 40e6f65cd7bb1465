//! # retrying
//!
//! **retrying** runs a fallible async operation again and again until it
//! succeeds, a caller-supplied condition refuses to retry, the retry budget runs
//! out, or a session deadline passes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   RetryConfig        RetryCondition        Operation
//!  (count, delay,     (error → retry?)    (Attempt → Future)
//!   timeout, prio)          │                    │
//!        └──────────────────┼────────────────────┘
//!                           ▼
//!                 Retrying (builder) ──► spawn() ──► RetryHandle (await / cancel)
//!                           │        └─► run()   ──► inline future
//!                           ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Session (retry loop)                                             │
//! │  - Deadline (start + timeout, fixed once)                         │
//! │  - run_attempt (one attempt under cancellation)                   │
//! │  - last_error (most recent failure)                               │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ publish(Event) (optional)
//!                                ▼
//!                       Bus (broadcast channel) ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Lifecycle
//! ```text
//! deadline = now + timeout
//!
//! for attempt in 0..=max_retry_count {
//!   ├─► cancelled?         → Err(Canceled)
//!   ├─► now >= deadline?   → Err(TimedOut { last_error })
//!   ├─► operation(attempt)
//!   │       ├─ Ok(v)  ──► return Ok(v)
//!   │       └─ Err(e) ──► last_error = e
//!   ├─► condition(e) == false     → Err(Aborted(e))   (original error)
//!   ├─► attempt == max_retry_count → Err(ExceededMaxRetryCount { last_error: e })
//!   └─► sleep(retry_delay) (cancellable)
//! }
//! ```
//!
//! The deadline is checked cooperatively, before each attempt and before each
//! delay: an attempt that overruns the deadline is not interrupted, the session
//! notices at the next boundary.
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                        |
//! |-------------------|-----------------------------------------------------------|-------------------------------------------|
//! | **Execution**     | Spawn or inline-run a retry session.                      | [`retrying`], [`Retrying`], [`RetryHandle`] |
//! | **Operations**    | Work to retry, with per-attempt context.                  | [`Operation`], [`Attempt`], [`Unindexed`] |
//! | **Policies**      | Decide which errors are retried.                          | [`RetryCondition`], [`Retryable`]         |
//! | **Configuration** | Retry count, delay, timeout, priority hint.               | [`RetryConfig`], [`Priority`]             |
//! | **Errors**        | Typed terminal failures.                                  | [`RetryError`], [`ConfigError`]           |
//! | **Events**        | Session lifecycle events and subscribers.                 | [`Bus`], [`Event`], [`Subscribe`]         |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber writing events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use retrying::{Attempt, RetryConfig, retrying};
//!
//! #[derive(Debug, thiserror::Error)]
//! enum FetchError {
//!     #[error("service unavailable")]
//!     Unavailable,
//!     #[error("not found")]
//!     NotFound,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let calls = Arc::new(AtomicUsize::new(0));
//!     let cfg = RetryConfig::default()
//!         .with_max_retry_count(5)
//!         .with_retry_delay(Duration::from_millis(10))
//!         .with_timeout(Duration::from_secs(30));
//!
//!     let counter = Arc::clone(&calls);
//!     let handle = retrying(
//!         cfg,
//!         |e: &FetchError| matches!(e, FetchError::Unavailable),
//!         move |attempt: Attempt| {
//!             counter.fetch_add(1, Ordering::SeqCst);
//!             async move {
//!                 if attempt.index() < 2 {
//!                     Err(FetchError::Unavailable)
//!                 } else {
//!                     Ok("payload")
//!                 }
//!             }
//!         },
//!     );
//!
//!     let value = handle.await;
//!     assert_eq!(value.ok(), Some("payload"));
//!     assert_eq!(calls.load(Ordering::SeqCst), 3);
//!
//!     // A non-retriable error comes back as-is.
//!     let err = retrying(
//!         RetryConfig::default(),
//!         |e: &FetchError| matches!(e, FetchError::Unavailable),
//!         |_attempt: Attempt| async { Err::<(), _>(FetchError::NotFound) },
//!     )
//!     .await
//!     .unwrap_err();
//!     assert!(matches!(err.into_operation_error(), Ok(FetchError::NotFound)));
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod operation;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Priority, RetryConfig};
pub use crate::core::{RetryHandle, Retrying, retrying};
pub use error::{ConfigError, RetryError};
pub use events::{Bus, DEFAULT_BUS_CAPACITY, Event, EventKind};
pub use operation::{Attempt, BoxAttemptFuture, Operation, Unindexed};
pub use policies::{Always, Never, OnRetryable, RetryCondition, Retryable};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in subscriber writing events through `tracing`.
// Enabled by default with the `logging` feature.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
