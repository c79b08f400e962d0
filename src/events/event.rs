//! # Lifecycle events emitted by supervisors and registries.
//!
//! The [`EventKind`] enum classifies events in three groups:
//! - **Service lifecycle**: starting, live, stop requested, failed, stopped
//! - **Registry**: aggregate shutdown, inconsistencies, exit report
//! - **Subscriber**: overflow and panic of event subscribers
//!
//! [`Event`] carries the metadata: timestamp, service name, start index, reason.
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases
//! monotonically; use it to restore order across receivers.
//!
//! ## Example
//! ```rust
//! use servisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ServiceFailed)
//!     .with_service("ticker")
//!     .with_index(3)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::ServiceFailed);
//! assert_eq!(ev.service.as_deref(), Some("ticker"));
//! assert_eq!(ev.index, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Service lifecycle ===
    /// `start` registered the service and spawned its body.
    ///
    /// Sets `service`, `index`.
    ServiceStarting,

    /// The body began executing (`started_at` recorded).
    ///
    /// Sets `service`, `index`.
    ServiceLive,

    /// `stop` was called; `ended_at` set and the context token cancelled.
    ///
    /// Sets `service`, `index`.
    ServiceStopRequested,

    /// The body returned an error or panicked.
    ///
    /// Sets `service`, `index`, `reason`.
    ServiceFailed,

    /// The cleanup hook returned an error or panicked.
    ///
    /// Sets `service`, `index`, `reason`.
    CleanupFailed,

    /// Finalization finished: cleanup ran and the service deregistered.
    ///
    /// Sets `service`, `index`.
    ServiceStopped,

    // === Registry ===
    /// A finishing service was not found in its registry.
    ///
    /// Sets `service`, `index`.
    RegistryInconsistency,

    /// An OS termination signal was observed.
    ShutdownRequested,

    /// `stop_all` drained the registry.
    AllStopped,

    /// `stop_all_within` hit its deadline.
    ///
    /// Sets `reason` (stuck service names).
    GraceExceeded,

    /// The exit guard was dropped while services were still registered.
    ///
    /// Sets `reason` (service names).
    ExitWithLiveServices,

    // === Subscribers ===
    /// A subscriber queue was full or closed; the event was dropped for it.
    ///
    /// Sets `service` (subscriber name), `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets `service` (subscriber name), `reason` (panic payload).
    SubscriberPanicked,
}

/// Lifecycle event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Process-wide, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Service (or subscriber) name, if applicable.
    pub service: Option<Arc<str>>,
    /// Diagnostic start index of the service, if applicable.
    pub index: Option<u64>,
    /// Human-readable reason (errors, overflow details, names).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event of the given kind with the current time and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, Ordering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            index: None,
            reason: None,
        }
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a start index.
    #[inline]
    pub fn with_index(mut self, index: u64) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_service(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_reason(info)
    }

    /// True for events about subscribers rather than services.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_increases() {
        let a = Event::new(EventKind::ServiceStarting);
        let b = Event::new(EventKind::ServiceLive);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn subscriber_helpers_fill_metadata() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_event());
        assert_eq!(ev.service.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));

        let ev = Event::subscriber_panicked("audit", "boom".into());
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        assert!(ev.index.is_none());
    }
}
