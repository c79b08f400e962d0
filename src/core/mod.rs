//! Runtime core: supervision, registry and shutdown.
//!
//! Internal modules:
//! - [`lifecycle`]: per-instance state and [`Liveness`];
//! - [`supervisor`]: start/stop protocol of one service;
//! - [`runner`]: body execution wrapper and finalization path;
//! - [`handle`]: cloneable completion handle returned by `start`;
//! - [`registry`]: process-wide set of active supervisors, aggregate shutdown;
//! - [`builder`]: supervisor and registry builders;
//! - [`config`]: registry-wide settings;
//! - [`shutdown`]: OS signals and the exit report.

mod builder;
mod config;
mod handle;
mod lifecycle;
mod registry;
mod runner;
mod shutdown;
mod supervisor;

pub use builder::{RegistryBuilder, SupervisorBuilder};
pub use config::Config;
pub use handle::ServiceHandle;
pub use lifecycle::Liveness;
pub use registry::Registry;
pub use shutdown::ExitGuard;
pub use supervisor::Supervisor;

pub(crate) use lifecycle::Lifecycle;
