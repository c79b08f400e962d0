//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]. Every [`Registry`](crate::Registry)
//! owns one bus; all supervisors registered there publish to it.
//!
//! ```text
//! Publishers (many):                      Receivers:
//!   Supervisor::start/stop ──┐
//!   service runner         ──┼──► Bus ──► registry listener ──► SubscriberSet
//!   Registry::stop_all     ──┘   (ring)└─► Bus::subscribe() (tests, tools)
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; events are dropped when no receiver exists.
//! - The ring buffer is shared by all receivers; a slow receiver observes
//!   `RecvError::Lagged(n)` and skips the `n` oldest items.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for lifecycle events.
///
/// Cheap to clone (holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus; `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_only_see_later_events() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::AllStopped));

        let mut rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        bus.publish(Event::new(EventKind::ShutdownRequested));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::ShutdownRequested);
        assert!(rx.try_recv().is_err());
    }
}
