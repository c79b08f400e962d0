//! # Process shutdown integration.
//!
//! - [`wait_for_shutdown_signal`]: completes on SIGINT/SIGTERM/SIGQUIT (unix) or Ctrl-C.
//! - [`ExitGuard`]: the process-teardown hook. Keep it alive for the duration of
//!   `main`; when dropped it warns about every service still registered.
//!
//! ```rust
//! use servisor::Registry;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let _exit = Registry::global().exit_guard();
//!     // start services, run, stop_all ...
//! }   // `_exit` dropped here: leftovers are logged
//! ```

use std::sync::Arc;

use tracing::warn;

use crate::core::registry::Registry;
use crate::events::{Event, EventKind};

/// Waits for a termination signal.
///
/// Returns `Err` if signal registration fails.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Reports services still registered when dropped.
#[must_use = "the report is emitted when the guard is dropped"]
pub struct ExitGuard {
    registry: Arc<Registry>,
}

impl ExitGuard {
    pub(crate) fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Names of the services that would be reported right now.
    pub fn leftovers(&self) -> Vec<String> {
        self.registry.names()
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let leftovers = self.leftovers();
        if leftovers.is_empty() {
            return;
        }
        warn!(services = ?leftovers, "exiting with services still registered");
        self.registry.bus().publish(
            Event::new(EventKind::ExitWithLiveServices).with_reason(format!("{leftovers:?}")),
        );
    }
}
