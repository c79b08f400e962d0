//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by supervisors and registries.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor::start`/`stop`, the service runner (live,
//!   failed, stopped), `Registry` (aggregate shutdown, exit report) and
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the registry listener that fans out to a `SubscriberSet`,
//!   or any receiver obtained from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
