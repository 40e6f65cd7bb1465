//! # Retry session configuration.
//!
//! Provides [`RetryConfig`], the immutable settings of one retry session, and
//! [`Priority`], an opaque scheduling hint passed through to every attempt.
//!
//! ## Sentinel values
//! - `max_retry_count = RetryConfig::UNBOUNDED` → retry until the condition refuses
//!   or the deadline passes
//! - `retry_delay = 0s` → next attempt starts immediately
//! - `timeout = None` → no deadline check at all

use std::time::Duration;

use crate::error::ConfigError;

/// Opaque scheduling hint attached to a session.
///
/// The executor never interprets it; each [`Attempt`](crate::Attempt) exposes it
/// and published events record it, so operations and subscribers may act on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u8);

impl Priority {
    pub const BACKGROUND: Priority = Priority(0);
    pub const LOW: Priority = Priority(64);
    pub const MEDIUM: Priority = Priority(128);
    pub const HIGH: Priority = Priority(192);

    /// Returns the raw value.
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Settings for one retry session.
///
/// ## Field semantics
/// - `max_retry_count`: retries after the first attempt (`0` = exactly one attempt)
/// - `retry_delay`: fixed pause between a failed retriable attempt and the next one
/// - `timeout`: session deadline measured from session start (`None` = no deadline)
/// - `priority`: opaque hint forwarded to attempts
///
/// The session takes the config by value; it is never changed once the loop starts.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use retrying::RetryConfig;
///
/// let cfg = RetryConfig::default()
///     .with_max_retry_count(5)
///     .with_retry_delay(Duration::from_millis(250))
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(cfg.attempt_budget(), 6);
/// assert_eq!(cfg.timeout(), Some(Duration::from_secs(10)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    max_retry_count: usize,
    retry_delay: Duration,
    timeout: Option<Duration>,
    priority: Option<Priority>,
}

impl RetryConfig {
    /// Retry count meaning "no attempt cap".
    ///
    /// Sessions configured with it end only on success, a non-retriable error,
    /// the deadline, or cancellation.
    pub const UNBOUNDED: usize = usize::MAX;

    /// Same as [`RetryConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of retries after the first attempt.
    pub fn with_max_retry_count(mut self, count: usize) -> Self {
        self.max_retry_count = count;
        self
    }

    /// Removes the attempt cap (see [`RetryConfig::UNBOUNDED`]).
    pub fn unbounded(self) -> Self {
        self.with_max_retry_count(Self::UNBOUNDED)
    }

    /// Sets the fixed delay between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the delay from fractional seconds.
    ///
    /// Fails for negative, NaN or out-of-range values.
    pub fn with_retry_delay_secs(self, secs: f64) -> Result<Self, ConfigError> {
        let delay =
            Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidDelay { secs })?;
        Ok(self.with_retry_delay(delay))
    }

    /// Sets the session timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the session timeout from fractional seconds.
    ///
    /// Fails for negative, NaN or out-of-range values.
    pub fn with_timeout_secs(self, secs: f64) -> Result<Self, ConfigError> {
        let timeout =
            Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout { secs })?;
        Ok(self.with_timeout(timeout))
    }

    /// Disables the deadline.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Sets the scheduling hint.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[inline]
    pub fn max_retry_count(&self) -> usize {
        self.max_retry_count
    }

    #[inline]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[inline]
    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Returns `true` if the attempt cap is [`RetryConfig::UNBOUNDED`].
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.max_retry_count == Self::UNBOUNDED
    }

    /// Total attempts allowed (`max_retry_count + 1`), saturating at `usize::MAX`.
    #[inline]
    pub fn attempt_budget(&self) -> usize {
        self.max_retry_count.saturating_add(1)
    }
}

impl Default for RetryConfig {
    /// Default configuration:
    ///
    /// - `max_retry_count = 3` (four attempts in total)
    /// - `retry_delay = 1s`
    /// - `timeout = None`
    /// - `priority = None`
    fn default() -> Self {
        Self {
            max_retry_count: 3,
            retry_delay: Duration::from_secs(1),
            timeout: None,
            priority: None,
        }
    }
}
