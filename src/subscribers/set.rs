//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which listens on a [`Bus`] and distributes events to
//! multiple subscribers without blocking the publishing sessions.
//!
//! ## Architecture
//! ```text
//! Bus ──► listener ──► emit(event)
//!                         │
//!                         ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!                         │    (bounded)         └──────► panic → SubscriberPanicked
//!                         ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!                         └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Filtering**: events a subscriber does not [`want`](Subscribe::wants) are never queued
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//! - **Lag**: if the listener falls behind the bus ring buffer, skipped events are lost
//! - **No fault loops**: a subscriber never receives overflow/panic reports about itself,
//!   and a panic while handling such a report is not reported again
//! - **Drop**: dropping the set stops its listener and workers without draining
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::{Arc, Weak};

use futures::FutureExt;
use tokio::select;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    sub: Arc<dyn Subscribe>,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Queues shared between the set and its bus listener.
struct Fanout {
    channels: Vec<SubscriberChannel>,
    bus: Bus,
}

impl Fanout {
    fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = event.is_subscriber_overflow();
        let is_fault_evt = is_overflow_evt || event.is_subscriber_panic();

        for channel in &self.channels {
            if !channel.sub.wants(event.kind) {
                continue;
            }
            if is_fault_evt && event.session.as_deref() == Some(channel.sub.name()) {
                continue;
            }
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.sub.name(), "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.sub.name(), "closed"));
                    }
                }
            }
        }
    }
}

/// Fan-out coordinator for multiple event subscribers.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use retrying::{Bus, SubscriberSet, Subscribe};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus = Bus::default();
/// let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
/// let set = SubscriberSet::attach(subs, &bus);
/// assert!(set.is_empty());
/// set.shutdown().await;
/// # }
/// ```
pub struct SubscriberSet {
    fanout: Arc<Fanout>,
    workers: Vec<JoinHandle<()>>,
    listener: Option<(JoinHandle<()>, DropGuard)>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// The set does not listen to `bus` on its own; overflow and panic events are
    /// published there. Use [`SubscriberSet::attach`] to also forward bus events.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let bus_for_worker = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());

                    let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await
                    else {
                        continue;
                    };
                    // A panic on a fault report is not reported again.
                    if !(ev.is_subscriber_panic() || ev.is_subscriber_overflow()) {
                        let info = {
                            let any = &*panic_err;
                            if let Some(msg) = any.downcast_ref::<&'static str>() {
                                (*msg).to_string()
                            } else if let Some(msg) = any.downcast_ref::<String>() {
                                msg.clone()
                            } else {
                                "unknown panic".to_string()
                            }
                        };
                        bus_for_worker.publish(Event::subscriber_panicked(s.name(), info));
                    }
                }
            });
            channels.push(SubscriberChannel { sub, sender: tx });
            workers.push(handle);
        }
        Self {
            fanout: Arc::new(Fanout { channels, bus }),
            workers,
            listener: None,
        }
    }

    /// Creates the set and forwards every event published on `bus` to it.
    ///
    /// Only events published **after** this call are delivered. The listener
    /// holds the queues weakly: once the set is dropped it stops forwarding.
    #[must_use]
    pub fn attach(subs: Vec<Arc<dyn Subscribe>>, bus: &Bus) -> Self {
        let mut set = Self::new(subs, bus.clone());
        let rx = bus.subscribe();
        let fanout = Arc::downgrade(&set.fanout);
        let stop = CancellationToken::new();

        let handle = tokio::spawn(listen(rx, fanout, stop.clone()));
        set.listener = Some((handle, stop.drop_guard()));
        set
    }

    /// Emits an event to all subscribers (clones the event).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    ///
    /// - Uses `try_send` (non-blocking)
    /// - On queue full/closed: drops the event, publishes `SubscriberOverflow`
    /// - `SubscriberOverflow` events are not re-published if they themselves overflow
    pub fn emit_arc(&self, event: Arc<Event>) {
        self.fanout.emit_arc(event);
    }

    /// Gracefully shuts down the listener and all subscriber workers.
    ///
    /// 1. Stops the bus listener once it has forwarded every event already published
    /// 2. Drops all channel senders (workers see channel closed)
    /// 3. Awaits all worker tasks to finish their queues
    pub async fn shutdown(self) {
        if let Some((handle, stop)) = self.listener {
            drop(stop);
            let _ = handle.await;
        }
        drop(self.fanout);

        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fanout.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fanout.channels.len()
    }
}

/// Forwards bus events into the fan-out until stopped, then drains what is left.
///
/// Returns early once the owning [`SubscriberSet`] is gone.
async fn listen(
    mut rx: broadcast::Receiver<Event>,
    fanout: Weak<Fanout>,
    stop: CancellationToken,
) {
    loop {
        select! {
            biased;
            res = rx.recv() => match res {
                Ok(ev) => {
                    if !forward(&fanout, ev) {
                        return;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return,
            },
            _ = stop.cancelled() => break,
        }
    }

    // Events published before the stop are still delivered, whichever arm won above.
    loop {
        match rx.try_recv() {
            Ok(ev) => {
                if !forward(&fanout, ev) {
                    return;
                }
            }
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return,
        }
    }
}

fn forward(fanout: &Weak<Fanout>, ev: Event) -> bool {
    match fanout.upgrade() {
        Some(fanout) => {
            fanout.emit_arc(Arc::new(ev));
            true
        }
        None => false,
    }
}
