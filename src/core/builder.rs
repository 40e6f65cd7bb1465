use std::fmt::Display;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{handle::RetryHandle, session::Session};
use crate::{
    config::RetryConfig, error::RetryError, events::Bus, operation::Operation,
    policies::RetryCondition,
};

/// Builder for one retry session with optional naming, events and cancellation.
///
/// `Retrying::new(cfg, condition, op).spawn()` is what [`retrying`](crate::retrying)
/// does; use the builder to attach a [`Bus`], a name, or a parent token, or to
/// [`run`](Retrying::run) the session inline instead of spawning it.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use retrying::{Attempt, Bus, RetryConfig, Retrying};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus = Bus::default();
/// let cfg = RetryConfig::default().with_retry_delay(Duration::ZERO);
///
/// let value = Retrying::new(cfg, |e: &String| e.starts_with("busy"), |a: Attempt| async move {
///     if a.index() < 2 { Err(format!("busy #{}", a.index())) } else { Ok(a.index()) }
/// })
/// .with_name("lookup")
/// .with_bus(bus)
/// .run()
/// .await;
///
/// assert_eq!(value.ok(), Some(2));
/// # }
/// ```
pub struct Retrying<Op, C> {
    config: RetryConfig,
    condition: C,
    operation: Op,
    name: Option<Arc<str>>,
    bus: Option<Bus>,
    token: CancellationToken,
}

impl<Op, C> Retrying<Op, C> {
    /// Creates a session from its configuration, retry condition and operation.
    pub fn new(config: RetryConfig, condition: C, operation: Op) -> Self {
        Self {
            config,
            condition,
            operation,
            name: None,
            bus: None,
            token: CancellationToken::new(),
        }
    }

    /// Names the session; the name is attached to every published event.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Publishes session events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Ties the session to `parent`: cancelling `parent` cancels the session.
    ///
    /// Cancelling the session (e.g. through its handle) does not affect `parent`.
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.token = parent.child_token();
        self
    }

    /// Token that cancels this session.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    fn into_parts(self) -> (Session<Op, C>, CancellationToken) {
        let session = Session {
            config: self.config,
            condition: self.condition,
            operation: self.operation,
            name: self.name,
            bus: self.bus,
        };
        (session, self.token)
    }

    /// Runs the session inside the current task.
    ///
    /// Dropping the returned future stops the session at its current suspension
    /// point, like any other future.
    pub async fn run<T, E>(self) -> Result<T, RetryError<E>>
    where
        Op: Operation<T, E>,
        C: RetryCondition<E>,
        E: Display,
    {
        let (session, token) = self.into_parts();
        session.run(token).await
    }

    /// Spawns the session on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime, like [`tokio::spawn`].
    pub fn spawn<T, E>(self) -> RetryHandle<T, E>
    where
        Op: Operation<T, E>,
        C: RetryCondition<E>,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        let (session, token) = self.into_parts();
        let join = tokio::spawn(session.run(token.clone()));
        RetryHandle::new(join, token)
    }
}

/// Spawns a retry session and returns its handle.
///
/// Shorthand for `Retrying::new(config, condition, operation).spawn()`.
///
/// # Panics
/// Panics when called outside a tokio runtime.
pub fn retrying<T, E, Op, C>(config: RetryConfig, condition: C, operation: Op) -> RetryHandle<T, E>
where
    Op: Operation<T, E>,
    C: RetryCondition<E>,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    Retrying::new(config, condition, operation).spawn()
}
