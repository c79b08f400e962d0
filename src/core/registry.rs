//! # Registry: the set of currently active supervisors.
//!
//! Membership means "started and not yet fully finalized". Only supervisors
//! mutate it: [`Supervisor::start`](crate::Supervisor::start) registers, the
//! service's own finalization path deregisters.
//!
//! ## Architecture
//! ```text
//!        start()                       runner::finalize()
//!   Supervisor ──► register(index) ──► BTreeMap<u64, Weak<Lifecycle>> ◄── deregister(index)
//!                                           │
//!                      snapshot() ──────────┘ (copy, ordered by index)
//!                          │
//!   stop_all() ──► join_all(stop() for each) ──► collect failures ──► assert empty
//! ```
//!
//! ## Rules
//! - The registry holds **weak** references; it never keeps a service alive.
//!   Entries whose supervisor was dropped are pruned whenever the set is read.
//! - The index counter is monotonic per registry, starting at 1.
//! - `stop_all` waits for every member before reporting failures.
//! - One process-wide instance is available via [`Registry::global`]; isolated
//!   instances (tests, embedded runtimes) via [`Registry::new`] / [`Registry::builder`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::join_all;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use tokio_util::sync::DropGuard;
use tracing::{debug, info, warn};

use crate::core::builder::RegistryBuilder;
use crate::core::config::Config;
use crate::core::lifecycle::Lifecycle;
use crate::core::shutdown::{self, ExitGuard};
use crate::core::supervisor::Supervisor;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Registry::new(Config::default()));

/// Collection of active supervisors with aggregate shutdown.
pub struct Registry {
    cfg: Config,
    bus: Bus,
    entries: Mutex<BTreeMap<u64, Weak<Lifecycle>>>,
    next_index: AtomicU64,
    _listener: Option<DropGuard>,
}

impl Registry {
    /// The process-wide registry (empty at process start, default config).
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Creates an isolated registry without subscribers.
    pub fn new(cfg: Config) -> Arc<Self> {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self::with_bus(cfg, bus, None)
    }

    /// Starts a builder (attach subscribers).
    pub fn builder(cfg: Config) -> RegistryBuilder {
        RegistryBuilder::new(cfg)
    }

    pub(crate) fn with_bus(cfg: Config, bus: Bus, listener: Option<DropGuard>) -> Arc<Self> {
        Arc::new(Self {
            cfg,
            bus,
            entries: Mutex::new(BTreeMap::new()),
            next_index: AtomicU64::new(0),
            _listener: listener,
        })
    }

    /// Registry configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus all member supervisors publish to.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.live_entries().len()
    }

    /// True if no service is registered.
    pub fn is_empty(&self) -> bool {
        self.live_entries().is_empty()
    }

    /// Point-in-time copy of the registered supervisors, ordered by start index.
    ///
    /// Later registry mutations do not affect a returned snapshot.
    pub fn snapshot(&self) -> Vec<Supervisor> {
        self.live_entries()
            .values()
            .filter_map(Weak::upgrade)
            .map(Supervisor::from_lifecycle)
            .collect()
    }

    /// Names of the registered services, ordered by start index.
    pub fn names(&self) -> Vec<String> {
        self.live_entries()
            .values()
            .filter_map(Weak::upgrade)
            .map(|lc| lc.name.to_string())
            .collect()
    }

    /// Stops every registered service concurrently and waits for all of them.
    ///
    /// # Errors
    /// - [`RuntimeError::StopFailed`] with every failed `stop`, after all members finished.
    /// - [`RuntimeError::RegistryNotEmpty`] if services remain registered afterwards.
    pub async fn stop_all(&self) -> Result<(), RuntimeError> {
        let members = self.snapshot();
        info!(count = members.len(), "stopping all services");

        let results = join_all(members.iter().map(|sup| sup.stop())).await;
        let failures: Vec<_> = results.into_iter().filter_map(Result::err).collect();
        if !failures.is_empty() {
            warn!(failed = failures.len(), "some services failed to stop");
            return Err(RuntimeError::StopFailed { failures });
        }

        let remaining = self.names();
        if !remaining.is_empty() {
            warn!(?remaining, "registry not empty after stop_all");
            return Err(RuntimeError::RegistryNotEmpty { remaining });
        }

        debug!("all services stopped");
        self.bus.publish(Event::new(EventKind::AllStopped));
        Ok(())
    }

    /// [`stop_all`](Self::stop_all) raced against `grace`.
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] naming the services still registered at
    /// the deadline; otherwise whatever `stop_all` returns.
    pub async fn stop_all_within(&self, grace: Duration) -> Result<(), RuntimeError> {
        match tokio::time::timeout(grace, self.stop_all()).await {
            Ok(res) => res,
            Err(_elapsed) => {
                let stuck = self.names();
                warn!(?grace, ?stuck, "grace period exceeded");
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason(format!("{stuck:?}")),
                );
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Waits for an OS termination signal, then stops everything within `Config::grace`.
    ///
    /// # Errors
    /// [`RuntimeError::Signal`] if signal listeners cannot be installed, otherwise
    /// whatever [`stop_all_within`](Self::stop_all_within) returns.
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        shutdown::wait_for_shutdown_signal()
            .await
            .map_err(|e| RuntimeError::Signal {
                error: e.to_string(),
            })?;
        info!("shutdown signal received");
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.stop_all_within(self.cfg.grace).await
    }

    /// Guard that reports still-registered services when dropped (at process exit).
    pub fn exit_guard(self: &Arc<Self>) -> ExitGuard {
        ExitGuard::new(Arc::clone(self))
    }

    /// Entries with dropped supervisors pruned.
    fn live_entries(&self) -> MutexGuard<'_, BTreeMap<u64, Weak<Lifecycle>>> {
        let mut entries = self.entries.lock();
        entries.retain(|_, lc| lc.strong_count() > 0);
        entries
    }

    pub(crate) fn next_index(&self) -> u64 {
        self.next_index.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn register(&self, index: u64, lc: &Arc<Lifecycle>) {
        self.entries.lock().insert(index, Arc::downgrade(lc));
    }

    /// Removes `index`; returns `false` if it was not registered.
    pub(crate) fn deregister(&self, index: u64) -> bool {
        self.entries.lock().remove(&index).is_some()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("services", &self.names())
            .field("cfg", &self.cfg)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_are_monotonic_from_one() {
        let reg = Registry::new(Config::default());
        assert_eq!(reg.next_index(), 1);
        assert_eq!(reg.next_index(), 2);
        assert_eq!(reg.next_index(), 3);
    }

    #[test]
    fn deregistering_an_unknown_index_is_reported() {
        let reg = Registry::new(Config::default());
        assert!(!reg.deregister(7));
        assert!(reg.is_empty());
    }

    #[test]
    fn dropped_supervisors_are_not_counted() {
        use crate::error::ServiceError;
        use crate::services::{ServiceContext, ServiceFn};

        let reg = Registry::new(Config::default());
        let svc = ServiceFn::arc("gone", |_ctx: ServiceContext| async {
            Ok::<(), ServiceError>(())
        });
        let lc = Lifecycle::new("gone".into(), svc, Arc::clone(&reg));
        reg.register(reg.next_index(), &lc);
        assert_eq!(reg.len(), 1);

        drop(lc);
        assert_eq!(reg.len(), 0);
        assert!(reg.is_empty());
        assert!(reg.names().is_empty());
        assert!(reg.snapshot().is_empty());
    }

    #[test]
    fn global_is_a_singleton() {
        assert!(Arc::ptr_eq(&Registry::global(), &Registry::global()));
    }

    #[tokio::test]
    async fn stop_all_on_empty_registry_succeeds() {
        let reg = Registry::new(Config::default());
        let mut rx = reg.bus().subscribe();
        reg.stop_all().await.expect("empty stop_all");
        assert_eq!(rx.recv().await.expect("event").kind, EventKind::AllStopped);
    }
}
