//! Retry policies.
//!
//! This module groups the knob that controls **if** a failed attempt is retried.
//! How often and how long to wait is plain configuration, see
//! [`RetryConfig`](crate::RetryConfig).
//!
//! ## Contents
//! - [`RetryCondition`] predicate over the operation error
//! - [`Retryable`] self-classifying errors, used through [`OnRetryable`]
//! - [`Always`], [`Never`] trivial conditions
//!
//! ## Quick wiring
//! ```text
//! Retrying::new(config, condition, operation)
//!      └─► core::session::Session uses:
//!           - condition.should_retry(&err) to decide retry/abort
//!           - config.retry_delay() to schedule the next attempt
//! ```

mod condition;

pub use condition::{Always, Never, OnRetryable, RetryCondition, Retryable};
