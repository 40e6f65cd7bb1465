//! # Events emitted by retry sessions.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Attempt events**: per-attempt flow (starting, succeeded, failed, backoff)
//! - **Terminal events**: how a session ended (deadline, exhaustion, abort, cancel)
//! - **Subscriber events**: fan-out problems (overflow, panic)
//!
//! The [`Event`] struct carries the metadata: timestamps, session name, attempt
//! index, delays and the failure reason rendered as text.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retrying::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::AttemptFailed)
//!     .with_session("fetch-user")
//!     .with_reason("connection refused")
//!     .with_attempt(2)
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::AttemptFailed);
//! assert_eq!(ev.session.as_deref(), Some("fetch-user"));
//! assert_eq!(ev.attempt, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::config::Priority;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of session events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `session`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `session`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Attempt events ===
    /// Session started; no attempt has run yet.
    ///
    /// Sets:
    /// - `session`, `priority`
    /// - `timeout_ms`: configured session timeout (if any)
    SessionStarting,

    /// An attempt is about to run.
    ///
    /// Sets:
    /// - `session`, `priority`
    /// - `attempt`: attempt index (0-based)
    AttemptStarting,

    /// The attempt returned a value; the session ends successfully.
    ///
    /// Sets:
    /// - `session`, `attempt`
    AttemptSucceeded,

    /// The attempt returned an error.
    ///
    /// Sets:
    /// - `session`, `attempt`
    /// - `reason`: error message
    AttemptFailed,

    /// The error was retriable; the next attempt runs after a delay.
    ///
    /// Sets:
    /// - `session`
    /// - `attempt`: index of the attempt that failed
    /// - `delay_ms`: delay before the next attempt
    /// - `reason`: error message
    BackoffScheduled,

    // === Terminal events ===
    /// Deadline reached before the next attempt could start.
    ///
    /// Sets:
    /// - `session`
    /// - `attempt`: number of attempts made
    /// - `timeout_ms`: configured session timeout
    /// - `reason`: last error message (if any attempt failed)
    DeadlineReached,

    /// Every attempt failed with a retriable error.
    ///
    /// Sets:
    /// - `session`
    /// - `attempt`: number of attempts made
    /// - `reason`: last error message
    RetriesExhausted,

    /// The condition refused to retry; the original error is returned.
    ///
    /// Sets:
    /// - `session`, `attempt`
    /// - `reason`: error message
    Aborted,

    /// Session cancelled during an attempt or a delay.
    ///
    /// Sets:
    /// - `session`
    /// - `attempt`: index of the attempt in progress or about to run
    Canceled,
}

impl EventKind {
    /// Returns `true` for the kinds that end a session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::AttemptSucceeded
                | EventKind::DeadlineReached
                | EventKind::RetriesExhausted
                | EventKind::Aborted
                | EventKind::Canceled
        )
    }
}

/// Session event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Session timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (error text, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Attempt index or count, see [`EventKind`].
    pub attempt: Option<usize>,
    /// Name of the session, if one was given.
    pub session: Option<Arc<str>>,
    /// Scheduling hint of the session.
    pub priority: Option<Priority>,
    /// Event classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            attempt: None,
            timeout_ms: None,
            reason: None,
            delay_ms: None,
            session: None,
            priority: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a session name.
    #[inline]
    pub fn with_session(mut self, session: impl Into<Arc<str>>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Attaches an optional session name.
    #[inline]
    pub fn with_session_opt(mut self, session: Option<&Arc<str>>) -> Self {
        self.session = session.cloned();
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an attempt index or count.
    #[inline]
    pub fn with_attempt(mut self, n: usize) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches the session priority hint.
    #[inline]
    pub fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_session(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_session(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
