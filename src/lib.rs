//! # servisor
//!
//! **servisor** wraps long-running, cooperative async services with uniform
//! start/stop semantics, failure capture, mandatory cleanup, and a
//! process-wide registry for coordinated shutdown.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Supervisor  │   │  Supervisor  │   │  Supervisor  │
//!     │ (service #1) │   │ (service #2) │   │ (service #3) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ start(): register + spawn runner    │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Registry (process-wide or isolated)                              │
//! │  - index → Weak<service state>  (membership = started, not final) │
//! │  - monotonic start index                                          │
//! │  - Bus (broadcast lifecycle events) ──► SubscriberSet (optional)  │
//! │  - stop_all / stop_all_within / run_until_signal / exit_guard     │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Supervisor::start()
//!   ├─► AlreadyStarted if already started
//!   ├─► index = next_index(); registry.register(index)
//!   └─► spawn runner ─► started_at = now            liveness: Unstarted ─► Live
//!                       service.run(ctx)
//!                         ├─ Ok / Canceled
//!                         └─ Err / panic ─► captured_error (logged, swallowed)
//!                       ended_at = now (if unset)   liveness: ─► Finished
//!                       service.cleanup()  (failure ─► cleanup_error)
//!                       registry.deregister(index)
//!
//! Supervisor::stop()
//!   └─► ended_at = now; token.cancel(); await runner
//! ```
//!
//! ## Features
//! | Area             | Description                                                  | Key types / traits                        |
//! |------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Services**     | Define the cooperative body and its cleanup hook.            | [`Service`], [`ServiceFn`], [`ServiceContext`] |
//! | **Supervision**  | Start once, stop cooperatively, capture failures.            | [`Supervisor`], [`Liveness`], [`ServiceHandle`] |
//! | **Registry**     | Enumerate active services, stop them all, report at exit.   | [`Registry`], [`ExitGuard`]               |
//! | **Events**       | Observe lifecycle transitions.                               | [`Event`], [`EventKind`], [`Subscribe`]   |
//! | **Errors**       | Typed errors for services, supervisors and registries.       | [`ServiceError`], [`SupervisorError`], [`RuntimeError`] |
//! | **Configuration**| Registry-wide settings.                                      | [`Config`]                                |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use parking_lot::Mutex;
//! use servisor::{Registry, Service, ServiceContext, ServiceError, Supervisor};
//!
//! #[derive(Default)]
//! struct Counter {
//!     seen: Mutex<Vec<u32>>,
//! }
//!
//! #[async_trait]
//! impl Service for Counter {
//!     async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
//!         let mut n = 0;
//!         while ctx.is_live() {
//!             self.seen.lock().push(n);
//!             n += 1;
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::new(Default::default());
//!     let counter = Arc::new(Counter::default());
//!
//!     let sup = Supervisor::builder(counter.clone()).registry(registry.clone()).build();
//!     assert_eq!(sup.name(), "Counter");
//!     sup.start()?;
//!
//!     tokio::time::sleep(Duration::from_millis(35)).await;
//!     registry.stop_all().await?;
//!
//!     assert!(registry.is_empty());
//!     assert!(!counter.seen.lock().is_empty());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    Config, ExitGuard, Liveness, Registry, RegistryBuilder, ServiceHandle, Supervisor,
    SupervisorBuilder,
};
pub use error::{RuntimeError, ServiceError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use services::{Service, ServiceContext, ServiceFn, ServiceRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: a subscriber that logs every event through `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
