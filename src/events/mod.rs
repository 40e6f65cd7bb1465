//! Session events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by retry sessions and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `core::session` (one event per loop step), `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumers**: [`SubscriberSet`](crate::SubscriberSet) listeners and any
//!   receiver obtained from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::{Bus, DEFAULT_BUS_CAPACITY};
pub use event::{Event, EventKind};
