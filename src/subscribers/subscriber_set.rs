//! # Non-blocking event fan-out to multiple subscribers.
//!
//! ## Rules
//! - `emit()` never blocks; it uses `try_send` on every queue.
//! - Per-subscriber FIFO; no ordering across subscribers.
//! - Overflow drops the event for that subscriber only and publishes
//!   `SubscriberOverflow` (never for an overflow event itself).
//! - A panicking subscriber is reported as `SubscriberPanicked`; its worker
//!   keeps processing the next events.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_message;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

struct Channel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator: one bounded queue and one worker per subscriber.
pub struct SubscriberSet {
    channels: Vec<Channel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            channels.push(Channel {
                name: sub.name(),
                sender: tx,
            });
            workers.push(tokio::spawn(worker(sub, rx, bus.clone())));
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Number of subscribers in the set.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if the set has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Queues a copy of `event` for every subscriber.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        let overflow_guard = event.is_subscriber_event();

        for ch in &self.channels {
            let reason = match ch.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !overflow_guard {
                self.bus.publish(Event::subscriber_overflow(ch.name, reason));
            }
        }
    }

    /// Closes every queue and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);
        for w in self.workers {
            let _ = w.await;
        }
    }
}

async fn worker(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = AssertUnwindSafe(sub.on_event(ev.as_ref()))
            .catch_unwind()
            .await;
        if let Err(payload) = handled {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_message(payload.as_ref()),
            ));
        }
    }
}
