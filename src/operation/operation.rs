//! # Operation abstraction.
//!
//! [`Operation`] is the unit of work a session retries. Every call produces a
//! **fresh** future that owns its state; nothing leaks between attempts unless the
//! caller shares it explicitly (e.g. an `Arc<...>` captured by the closure).
//!
//! Two ways to get one:
//! - any `FnMut(Attempt) -> Fut` closure (sees the attempt index, priority, token);
//! - [`Unindexed::new`] around a `FnMut() -> Fut` closure that does not care.

use std::future::Future;
use std::pin::Pin;

use crate::operation::attempt::Attempt;

/// Boxed future returned by [`Operation::call`].
pub type BoxAttemptFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// # Fallible asynchronous unit of work.
///
/// # Example
/// ```
/// use retrying::{Attempt, BoxAttemptFuture, Operation};
///
/// struct Ping {
///     host: String,
/// }
///
/// impl Operation<u64, std::io::Error> for Ping {
///     fn call(&mut self, attempt: Attempt) -> BoxAttemptFuture<u64, std::io::Error> {
///         let host = self.host.clone();
///         Box::pin(async move {
///             let _ = (host, attempt.index());
///             Ok(42)
///         })
///     }
/// }
/// ```
pub trait Operation<T, E>: Send + 'static {
    /// Starts one attempt.
    fn call(&mut self, attempt: Attempt) -> BoxAttemptFuture<T, E>;
}

impl<F, Fut, T, E> Operation<T, E> for F
where
    F: FnMut(Attempt) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    fn call(&mut self, attempt: Attempt) -> BoxAttemptFuture<T, E> {
        Box::pin((self)(attempt))
    }
}

/// Adapter for factories that ignore the attempt context.
///
/// ```
/// use retrying::Unindexed;
///
/// let op = Unindexed::new(|| async { Ok::<_, std::io::Error>("pong") });
/// # let _ = op;
/// ```
#[derive(Debug)]
pub struct Unindexed<F> {
    f: F,
}

impl<F> Unindexed<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut, T, E> Operation<T, E> for Unindexed<F>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    fn call(&mut self, _attempt: Attempt) -> BoxAttemptFuture<T, E> {
        Box::pin((self.f)())
    }
}
