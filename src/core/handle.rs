//! # Handle to a spawned retry session.
//!
//! [`RetryHandle`] wraps the tokio [`JoinHandle`] of a session together with its
//! [`CancellationToken`].
//!
//! ## Rules
//! - Awaiting the handle yields the session outcome.
//! - [`RetryHandle::cancel`] is cooperative: the session stops at its current
//!   attempt or delay and resolves to [`RetryError::Canceled`].
//! - [`RetryHandle::abort`] aborts the tokio task; awaiting then also yields `Canceled`.
//! - A panic inside the operation is resumed on the awaiting task.
//! - Dropping the handle detaches the session; it keeps running.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::RetryError;

/// Awaitable, cancellable handle to a spawned session.
#[derive(Debug)]
#[must_use = "dropping a RetryHandle detaches the session; await it or call cancel()"]
pub struct RetryHandle<T, E> {
    join: JoinHandle<Result<T, RetryError<E>>>,
    token: CancellationToken,
}

impl<T, E> RetryHandle<T, E> {
    pub(crate) fn new(
        join: JoinHandle<Result<T, RetryError<E>>>,
        token: CancellationToken,
    ) -> Self {
        Self { join, token }
    }

    /// Requests cooperative cancellation of the session.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Aborts the underlying tokio task.
    pub fn abort(&self) {
        self.join.abort();
    }

    /// Returns `true` once the session has produced its outcome.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Token that cancels this session.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl<T, E> Future for RetryHandle<T, E> {
    type Output = Result<T, RetryError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(Pin::new(&mut self.join).poll(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_cancelled) => Poll::Ready(Err(RetryError::Canceled)),
        }
    }
}
