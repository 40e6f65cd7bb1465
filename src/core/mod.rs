//! Retry core: the session state machine and its drivers.
//!
//! The public API from this module is [`Retrying`] (builder) and
//! [`RetryHandle`] (spawned session).
//!
//! Internal modules:
//! - [`attempt`]: runs one attempt under cancellation;
//! - [`deadline`]: session deadline, fixed at start;
//! - [`session`]: the retry loop (attempts, condition, delay, terminal errors);
//! - [`builder`]: [`Retrying`] builder, inline `run` and `spawn`;
//! - [`handle`]: [`RetryHandle`] over the spawned tokio task.

mod attempt;
mod builder;
mod deadline;
mod handle;
mod session;

pub use builder::{Retrying, retrying};
pub use handle::RetryHandle;
