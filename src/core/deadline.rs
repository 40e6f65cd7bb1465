//! # Session deadline.
//!
//! A [`Deadline`] is fixed once, when the session starts: `start + timeout`.
//! It is never recomputed. Checks are cooperative: the session polls
//! [`Deadline::expired`] before each attempt and before each delay, it does not
//! interrupt an attempt that is already running.
//!
//! Built on [`tokio::time::Instant`], so a paused test clock drives it too.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Deadline {
    timeout: Option<Duration>,
    at: Option<Instant>,
}

impl Deadline {
    /// Captures `now` and computes the deadline.
    ///
    /// A timeout too large to add to `now` behaves like no timeout.
    pub(crate) fn start(timeout: Option<Duration>) -> Self {
        let at = timeout.and_then(|t| Instant::now().checked_add(t));
        Self { timeout, at }
    }

    /// Absolute deadline, `None` when not enforced.
    #[inline]
    pub(crate) fn instant(&self) -> Option<Instant> {
        self.at
    }

    /// Returns the configured timeout if the deadline has passed.
    pub(crate) fn expired(&self) -> Option<Duration> {
        match (self.at, self.timeout) {
            (Some(at), Some(timeout)) if Instant::now() >= at => Some(timeout),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_no_timeout_never_expires() {
        let d = Deadline::start(None);
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(d.expired().is_none());
        assert!(d.instant().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_at_exact_instant() {
        let d = Deadline::start(Some(Duration::from_secs(3)));
        tokio::time::advance(Duration::from_millis(2999)).await;
        assert!(d.expired().is_none());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(d.expired(), Some(Duration::from_secs(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_is_already_expired() {
        let d = Deadline::start(Some(Duration::ZERO));
        assert_eq!(d.expired(), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflowing_timeout_is_unbounded() {
        let d = Deadline::start(Some(Duration::MAX));
        assert!(d.instant().is_none());
        assert!(d.expired().is_none());
    }
}
