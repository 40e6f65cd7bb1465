//! # Operation abstractions.
//!
//! This module provides the operation-related types:
//! - [`Operation`] - trait for the fallible async work a session retries
//! - [`Attempt`] - per-attempt context (index, priority, cancellation token)
//! - [`Unindexed`] - adapter for closures that ignore the attempt context
//! - [`BoxAttemptFuture`] - boxed future returned by [`Operation::call`]

mod attempt;
#[allow(clippy::module_inception)]
mod operation;

pub use attempt::Attempt;
pub use operation::{BoxAttemptFuture, Operation, Unindexed};
