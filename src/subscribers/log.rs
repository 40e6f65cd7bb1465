//! # LogWriter: events as `tracing` records
//!
//! A subscriber that writes incoming [`Event`]s through [`tracing`], with the
//! event metadata as structured fields. Install any `tracing` subscriber (e.g.
//! `tracing_subscriber::fmt`) to see them.
//!
//! ## Levels
//! - `debug`: session/attempt starting, backoff scheduled
//! - `info`: attempt succeeded, session cancelled
//! - `warn`: attempt failed, deadline reached, retries exhausted, aborted
//! - `error`: subscriber overflow/panic

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let session = e.session.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        let priority = e.priority.map(|p| p.get());

        match e.kind {
            EventKind::SessionStarting => {
                tracing::debug!(session, timeout_ms = ?e.timeout_ms, ?priority, "session starting");
            }
            EventKind::AttemptStarting => {
                tracing::debug!(session, attempt = ?e.attempt, ?priority, "attempt starting");
            }
            EventKind::AttemptSucceeded => {
                tracing::info!(session, attempt = ?e.attempt, "attempt succeeded");
            }
            EventKind::AttemptFailed => {
                tracing::warn!(session, attempt = ?e.attempt, reason, "attempt failed");
            }
            EventKind::BackoffScheduled => {
                tracing::debug!(
                    session,
                    after_attempt = ?e.attempt,
                    delay_ms = ?e.delay_ms,
                    reason,
                    "retry scheduled"
                );
            }
            EventKind::DeadlineReached => {
                tracing::warn!(
                    session,
                    attempts = ?e.attempt,
                    timeout_ms = ?e.timeout_ms,
                    reason,
                    "deadline reached"
                );
            }
            EventKind::RetriesExhausted => {
                tracing::warn!(session, attempts = ?e.attempt, reason, "retries exhausted");
            }
            EventKind::Aborted => {
                tracing::warn!(session, attempt = ?e.attempt, reason, "non-retriable error");
            }
            EventKind::Canceled => {
                tracing::info!(session, attempt = ?e.attempt, "session cancelled");
            }
            EventKind::SubscriberOverflow => {
                tracing::error!(subscriber = session, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(subscriber = session, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
