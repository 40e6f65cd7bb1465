//! # Per-attempt context handed to the operation.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::Priority;

/// Context of one attempt.
///
/// Carries the 0-based attempt index, the session priority hint, the session
/// deadline and a cancellation token. The token is a child of the session token:
/// it fires when the session is cancelled, so long-running operations can stop
/// cooperatively.
#[derive(Clone, Debug)]
pub struct Attempt {
    index: usize,
    priority: Option<Priority>,
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl Attempt {
    pub(crate) fn new(
        index: usize,
        priority: Option<Priority>,
        deadline: Option<Instant>,
        token: CancellationToken,
    ) -> Self {
        Self {
            index,
            priority,
            deadline,
            token,
        }
    }

    /// Attempt index, starting at 0 for the first call.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// `true` on the first attempt of the session.
    #[inline]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Scheduling hint configured for the session.
    #[inline]
    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Session deadline, `None` when no timeout is configured.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the session deadline (`Some(ZERO)` once passed).
    ///
    /// The session never interrupts a running attempt at its deadline; operations
    /// that must not overrun can bound their own work with this value.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Token cancelled when the session is cancelled.
    #[inline]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Shorthand for `self.token().is_cancelled()`.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
