//! Error types produced by retry sessions and their configuration.
//!
//! This module defines two error enums:
//!
//! - [`RetryError`]: the terminal failure of one retry session.
//! - [`ConfigError`]: rejected values when building a [`RetryConfig`](crate::RetryConfig).
//!
//! Both provide `as_label` for logs/metrics. [`RetryError`] also exposes the last
//! operation error it carries, if any.

use std::time::Duration;
use thiserror::Error;

/// # Terminal failure of a retry session.
///
/// Exactly one of these (or a success value) ends every session:
///
/// | Variant                   | Cause                                              | Last error       |
/// |---------------------------|----------------------------------------------------|------------------|
/// | `Aborted`                 | condition classified the error as non-retriable    | the error itself |
/// | `TimedOut`                | deadline reached before an attempt could start     | optional         |
/// | `ExceededMaxRetryCount`   | every attempt failed with a retriable error        | always present   |
/// | `Canceled`                | session was cancelled externally                   | none             |
///
/// `Aborted` is transparent: its `Display` and `source()` are those of the original
/// error, and [`RetryError::into_operation_error`] hands back the exact value.
///
/// # Example
/// ```
/// use retrying::RetryError;
///
/// let err: RetryError<std::io::Error> = RetryError::Canceled;
/// assert_eq!(err.as_label(), "retry_canceled");
/// assert!(err.last_error().is_none());
/// ```
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// The operation failed with an error the condition refused to retry.
    ///
    /// Carries the original error verbatim.
    #[error(transparent)]
    Aborted(E),

    /// The deadline elapsed before the next attempt could start.
    #[error("timed out after {timeout:?} ({attempts} attempts made)")]
    TimedOut {
        /// The configured session timeout.
        timeout: Duration,
        /// Number of attempts that ran before the deadline was observed.
        attempts: usize,
        /// Error of the most recent attempt (`None` if no attempt failed yet).
        #[source]
        last_error: Option<E>,
    },

    /// All permitted attempts failed with retriable errors.
    #[error("exceeded max retry count after {attempts} attempts")]
    ExceededMaxRetryCount {
        /// Number of attempts made (`max_retry_count + 1`).
        attempts: usize,
        /// Error of the final attempt.
        #[source]
        last_error: E,
    },

    /// The session was cancelled during an attempt or the delay between attempts.
    #[error("retry session cancelled")]
    Canceled,
}

impl<E> RetryError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Aborted(_) => "retry_aborted",
            RetryError::TimedOut { .. } => "retry_timed_out",
            RetryError::ExceededMaxRetryCount { .. } => "retry_exhausted",
            RetryError::Canceled => "retry_canceled",
        }
    }

    /// Returns the most recent operation error carried by this failure.
    ///
    /// For `Aborted` this is the non-retriable error itself.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            RetryError::Aborted(e) => Some(e),
            RetryError::TimedOut { last_error, .. } => last_error.as_ref(),
            RetryError::ExceededMaxRetryCount { last_error, .. } => Some(last_error),
            RetryError::Canceled => None,
        }
    }

    /// Consumes the failure and returns the most recent operation error, if any.
    pub fn into_last_error(self) -> Option<E> {
        match self {
            RetryError::Aborted(e) => Some(e),
            RetryError::TimedOut { last_error, .. } => last_error,
            RetryError::ExceededMaxRetryCount { last_error, .. } => Some(last_error),
            RetryError::Canceled => None,
        }
    }

    /// Returns the original error if the session was aborted by the condition.
    ///
    /// Gives back `Err(self)` for every other kind so callers can keep matching.
    pub fn into_operation_error(self) -> Result<E, Self> {
        match self {
            RetryError::Aborted(e) => Ok(e),
            other => Err(other),
        }
    }

    /// Number of attempts recorded by the exhaustion kinds.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            RetryError::TimedOut { attempts, .. }
            | RetryError::ExceededMaxRetryCount { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted(_))
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::TimedOut { .. })
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::ExceededMaxRetryCount { .. })
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        matches!(self, RetryError::Canceled)
    }
}

/// # Errors produced while building a configuration.
///
/// Only the fractional-second constructors can fail; `Duration` values are
/// non-negative by construction.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Retry delay was negative, NaN or too large for a `Duration`.
    #[error("invalid retry delay: {secs}s (expected a finite, non-negative number)")]
    InvalidDelay {
        /// The rejected value in seconds.
        secs: f64,
    },

    /// Session timeout was negative, NaN or too large for a `Duration`.
    #[error("invalid timeout: {secs}s (expected a finite, non-negative number)")]
    InvalidTimeout {
        /// The rejected value in seconds.
        secs: f64,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidDelay { .. } => "config_invalid_delay",
            ConfigError::InvalidTimeout { .. } => "config_invalid_timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error, PartialEq)]
    #[error("boom #{0}")]
    struct Boom(u32);

    #[test]
    fn aborted_is_transparent() {
        let err = RetryError::Aborted(Boom(7));
        assert_eq!(err.to_string(), "boom #7");
        assert_eq!(err.into_operation_error().ok(), Some(Boom(7)));
    }

    #[test]
    fn exhausted_exposes_source() {
        let err = RetryError::ExceededMaxRetryCount {
            attempts: 4,
            last_error: Boom(4),
        };
        assert_eq!(err.as_label(), "retry_exhausted");
        assert_eq!(err.attempts(), Some(4));
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("boom #4")
        );
        assert!(err.into_operation_error().is_err());
    }

    #[test]
    fn timed_out_without_failure_has_no_source() {
        let err: RetryError<Boom> = RetryError::TimedOut {
            timeout: Duration::from_secs(3),
            attempts: 0,
            last_error: None,
        };
        assert!(err.source().is_none());
        assert!(err.is_timeout());
        assert_eq!(err.into_last_error(), None);
    }

    #[test]
    fn config_error_labels() {
        let err = ConfigError::InvalidDelay { secs: -1.0 };
        assert_eq!(err.as_label(), "config_invalid_delay");
        assert!(err.to_string().contains("-1"));
    }
}
