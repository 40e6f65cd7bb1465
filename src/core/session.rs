//! # Session: the retry loop.
//!
//! Runs one [`Operation`] until it succeeds or a terminal condition is hit:
//! - attempts per [`RetryConfig::max_retry_count`],
//! - fixed delay per [`RetryConfig::retry_delay`],
//! - optional session deadline per [`RetryConfig::timeout`],
//! - retry eligibility per [`RetryCondition`],
//! - cooperative cancellation via [`CancellationToken`].
//!
//! ## Architecture
//! ```text
//! deadline = start + timeout (once)
//!
//! loop attempt in 0..=max_retry_count {
//!   ├─► cancelled?              → Canceled
//!   ├─► deadline passed?        → TimedOut { last_error }
//!   ├─► publish AttemptStarting
//!   ├─► run_attempt(attempt) ───► Ok(v)     → publish AttemptSucceeded, return v
//!   │                        ───► Canceled  → publish Canceled
//!   │                        ───► Err(e)    → publish AttemptFailed
//!   ├─► condition(e) == false   → publish Aborted, return e unchanged
//!   ├─► attempt == max          → publish RetriesExhausted { last_error: e }
//!   ├─► deadline passed?        → TimedOut { last_error: e } (delay skipped)
//!   └─► publish BackoffScheduled, sleep(retry_delay) (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** (never concurrent within one session)
//! - The deadline is computed **once** and checked only at loop boundaries
//! - `last_error` is local to the loop and always holds the most recent failure

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    config::RetryConfig,
    core::{
        attempt::{AttemptOutcome, run_attempt},
        deadline::Deadline,
    },
    error::RetryError,
    events::{Bus, Event, EventKind},
    operation::{Attempt, Operation},
    policies::RetryCondition,
};

/// One retry session: configuration, condition, operation and where to report.
pub(crate) struct Session<Op, C> {
    pub(crate) config: RetryConfig,
    pub(crate) condition: C,
    pub(crate) operation: Op,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) bus: Option<Bus>,
}

impl<Op, C> Session<Op, C> {
    /// Runs the loop until success, abort, timeout, exhaustion, or cancellation.
    ///
    /// ### Deadline semantics
    /// - Captured once at entry (`start + timeout`)
    /// - Checked before each attempt: an attempt never starts past the deadline
    /// - Checked before each delay: no point sleeping into a dead session
    /// - A running attempt or delay is **not** interrupted by the deadline
    ///
    /// ### Cancellation semantics
    /// - `token` is observed during the attempt and during the delay
    /// - Cancellation always ends the session with [`RetryError::Canceled`]
    pub(crate) async fn run<T, E>(mut self, token: CancellationToken) -> Result<T, RetryError<E>>
    where
        Op: Operation<T, E>,
        C: RetryCondition<E>,
        E: Display,
    {
        let deadline = Deadline::start(self.config.timeout());
        let max = self.config.max_retry_count();
        let delay = self.config.retry_delay();
        let priority = self.config.priority();

        self.publish(|| {
            let ev = Event::new(EventKind::SessionStarting).with_priority(priority);
            match self.config.timeout() {
                Some(t) => ev.with_timeout(t),
                None => ev,
            }
        });

        let mut last_error: Option<E> = None;
        let mut attempt: usize = 0;

        loop {
            if token.is_cancelled() {
                self.publish(|| Event::new(EventKind::Canceled).with_attempt(attempt));
                return Err(RetryError::Canceled);
            }
            if let Some(timeout) = deadline.expired() {
                return Err(self.timed_out(timeout, attempt, last_error));
            }

            self.publish(|| {
                Event::new(EventKind::AttemptStarting)
                    .with_attempt(attempt)
                    .with_priority(priority)
            });
            let ctx = Attempt::new(attempt, priority, deadline.instant(), token.child_token());

            let err = match run_attempt(&mut self.operation, ctx, &token).await {
                AttemptOutcome::Succeeded(v) => {
                    self.publish(|| Event::new(EventKind::AttemptSucceeded).with_attempt(attempt));
                    return Ok(v);
                }
                AttemptOutcome::Canceled => {
                    self.publish(|| Event::new(EventKind::Canceled).with_attempt(attempt));
                    return Err(RetryError::Canceled);
                }
                AttemptOutcome::Failed(e) => e,
            };
            self.publish(|| {
                Event::new(EventKind::AttemptFailed)
                    .with_attempt(attempt)
                    .with_reason(err.to_string())
            });

            if !self.condition.should_retry(&err) {
                self.publish(|| {
                    Event::new(EventKind::Aborted)
                        .with_attempt(attempt)
                        .with_reason(err.to_string())
                });
                return Err(RetryError::Aborted(err));
            }

            let attempts = attempt.saturating_add(1);
            if attempt == max {
                self.publish(|| {
                    Event::new(EventKind::RetriesExhausted)
                        .with_attempt(attempts)
                        .with_reason(err.to_string())
                });
                return Err(RetryError::ExceededMaxRetryCount {
                    attempts,
                    last_error: err,
                });
            }

            if let Some(timeout) = deadline.expired() {
                return Err(self.timed_out(timeout, attempts, Some(err)));
            }

            self.publish(|| {
                Event::new(EventKind::BackoffScheduled)
                    .with_attempt(attempt)
                    .with_delay(delay)
                    .with_reason(err.to_string())
            });
            last_error = Some(err);

            if !sleep_or_cancel(delay, &token).await {
                self.publish(|| Event::new(EventKind::Canceled).with_attempt(attempts));
                return Err(RetryError::Canceled);
            }
            attempt = attempts;
        }
    }

    fn timed_out<E: Display>(
        &self,
        timeout: Duration,
        attempts: usize,
        last_error: Option<E>,
    ) -> RetryError<E> {
        self.publish(|| {
            let ev = Event::new(EventKind::DeadlineReached)
                .with_attempt(attempts)
                .with_timeout(timeout);
            match &last_error {
                Some(e) => ev.with_reason(e.to_string()),
                None => ev,
            }
        });
        RetryError::TimedOut {
            timeout,
            attempts,
            last_error,
        }
    }

    /// Builds and publishes an event only when a bus is attached.
    fn publish(&self, build: impl FnOnce() -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(build().with_session_opt(self.name.as_ref()));
        }
    }
}

/// Sleeps for `delay` unless `token` fires first. Returns `false` on cancellation.
async fn sleep_or_cancel(delay: Duration, token: &CancellationToken) -> bool {
    if delay.is_zero() {
        tokio::task::yield_now().await;
        return !token.is_cancelled();
    }
    let sleep = time::sleep(delay);
    tokio::pin!(sleep);
    select! {
        biased;
        _ = token.cancelled() => false,
        _ = &mut sleep => true,
    }
}
