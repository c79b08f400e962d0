//! # Event subscribers.
//!
//! Plug observers into a [`Registry`](crate::Registry) bus:
//! - [`Subscribe`]: the extension trait;
//! - [`SubscriberSet`]: per-subscriber queues and workers with panic isolation;
//! - `LogWriter`: renders events through `tracing` (feature `logging`).
//!
//! ```text
//! Bus ──► registry listener ──► SubscriberSet::emit(&Event)
//!                                  ├──► [queue] ──► worker ──► sub1.on_event()
//!                                  └──► [queue] ──► worker ──► subN.on_event()
//! ```

mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
mod log;

pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;

#[cfg(feature = "logging")]
pub use log::LogWriter;
