//! # Event subscriber trait.
//!
//! Each subscriber gets a dedicated worker task and a bounded queue
//! (capacity via [`Subscribe::queue_capacity`]). A slow subscriber only
//! affects its own queue; overflow drops the event for that subscriber and
//! publishes `EventKind::SubscriberOverflow`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use servisor::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::ServiceFailed) {
//!             // bump a counter, page someone, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of lifecycle events.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally. Panics are caught and reported as
///   `EventKind::SubscriberPanicked`, but the event is lost.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event. Events arrive in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Subscriber name used in overflow/panic events.
    ///
    /// Defaults to `type_name::<Self>()`; override with something short.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
