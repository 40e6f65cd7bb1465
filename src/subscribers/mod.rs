//! # Event subscribers for retry sessions.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! built-in implementations for handling events broadcast through the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Session ── publish(Event) ──► Bus ──► SubscriberSet listener
//!                                              │
//!                                         ┌────┴────┬─────────┬───────┐
//!                                         ▼         ▼         ▼       ▼
//!                                       LogWriter  Metrics  Custom  ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
