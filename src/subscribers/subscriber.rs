//! # Session event subscriber.
//!
//! [`Subscribe`] is how callers observe retry sessions without touching the retry
//! loop: implement it, hand it to a [`SubscriberSet`](crate::SubscriberSet), and
//! attach the set to the [`Bus`](crate::Bus) your sessions publish on.
//!
//! ```text
//! Session ── publish ──► Bus ──► SubscriberSet ──► wants(kind)? ──► queue ──► on_event()
//! ```
//!
//! A subscriber only ever sees events it [`wants`](Subscribe::wants), in publish
//! order, from its own worker task. A full queue loses the event for that
//! subscriber alone and raises `EventKind::SubscriberOverflow`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use retrying::{Event, EventKind, Subscribe};
//!
//! /// Counts sessions that gave up.
//! struct GaveUp(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for GaveUp {
//!     async fn on_event(&self, _ev: &Event) {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!     }
//!
//!     fn wants(&self, kind: EventKind) -> bool {
//!         matches!(kind, EventKind::RetriesExhausted | EventKind::DeadlineReached)
//!     }
//!
//!     fn name(&self) -> &'static str { "gave-up" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Observer of session events.
///
/// Implementations run on a dedicated worker; they should use async I/O and
/// handle their own errors. A panic is caught and reported as
/// `EventKind::SubscriberPanicked`, and the worker keeps going.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Filters events before they are queued. Default: every kind.
    ///
    /// Rejected events never take queue space, so a narrow filter also makes
    /// overflow less likely.
    fn wants(&self, kind: EventKind) -> bool {
        let _ = kind;
        true
    }

    /// Name reported in overflow/panic events. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue capacity for this subscriber (at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
