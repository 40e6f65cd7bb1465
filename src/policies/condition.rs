//! # Retry conditions.
//!
//! [`RetryCondition`] decides, for each failed attempt, whether the session keeps
//! going (`true`) or stops and hands the error back unchanged (`false`).
//!
//! - any `Fn(&E) -> bool` closure is a condition;
//! - [`Always`] / [`Never`] retry everything / nothing;
//! - [`OnRetryable`] delegates to the error's own [`Retryable::is_retryable`].
//!
//! Conditions are called once per failed attempt and may be called many times per
//! session, so they should be cheap and side-effect free.
//!
//! ## Example
//! ```rust
//! use retrying::{Always, RetryCondition};
//!
//! #[derive(Debug)]
//! enum FetchError { Unavailable, NotFound }
//!
//! let transient = |e: &FetchError| matches!(e, FetchError::Unavailable);
//! assert!(transient.should_retry(&FetchError::Unavailable));
//! assert!(!transient.should_retry(&FetchError::NotFound));
//! assert!(RetryCondition::<FetchError>::should_retry(&Always, &FetchError::NotFound));
//! ```

/// Classifies an operation error as retriable or terminal.
pub trait RetryCondition<E>: Send + Sync + 'static {
    /// Returns `true` to retry, `false` to stop and return the error as-is.
    fn should_retry(&self, error: &E) -> bool;
}

impl<E, F> RetryCondition<E> for F
where
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    #[inline]
    fn should_retry(&self, error: &E) -> bool {
        self(error)
    }
}

/// Error types that know whether they are worth retrying.
///
/// # Example
/// ```
/// use retrying::{OnRetryable, RetryCondition, Retryable};
///
/// #[derive(Debug)]
/// enum DbError { Busy, Corrupt }
///
/// impl Retryable for DbError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, DbError::Busy)
///     }
/// }
///
/// assert!(OnRetryable.should_retry(&DbError::Busy));
/// assert!(!OnRetryable.should_retry(&DbError::Corrupt));
/// ```
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for std::io::Error {
    /// Transient I/O kinds: interrupted, would-block, timed out, connection reset/aborted/refused.
    fn is_retryable(&self) -> bool {
        use std::io::ErrorKind::*;
        matches!(
            self.kind(),
            Interrupted
                | WouldBlock
                | TimedOut
                | ConnectionReset
                | ConnectionAborted
                | ConnectionRefused
        )
    }
}

/// Retries errors whose [`Retryable::is_retryable`] returns `true`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OnRetryable;

impl<E: Retryable> RetryCondition<E> for OnRetryable {
    #[inline]
    fn should_retry(&self, error: &E) -> bool {
        error.is_retryable()
    }
}

/// Retries every error.
#[derive(Clone, Copy, Debug, Default)]
pub struct Always;

impl<E> RetryCondition<E> for Always {
    #[inline]
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// Retries nothing: the first failure is returned as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Never;

impl<E> RetryCondition<E> for Never {
    #[inline]
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}
