//! # Supervisor: lifecycle wrapper around one service body.
//!
//! A [`Supervisor`] runs one [`Service`](crate::Service) exactly once with
//! uniform start/stop semantics, failure capture and mandatory cleanup.
//!
//! ## Start/stop protocol
//! ```text
//! start()
//!   ├─► index already set?  ─► Err(AlreadyStarted)
//!   ├─► index = registry.next_index()
//!   ├─► registry.register(index, self)
//!   ├─► publish ServiceStarting
//!   └─► tokio::spawn(runner::run_service(..).instrument(span{name,index}))
//!
//! stop()
//!   ├─► no handle ─► Ok(())
//!   ├─► ended_at = now (if unset) ─► liveness() == Finished
//!   ├─► token.cancel()
//!   ├─► publish ServiceStopRequested
//!   └─► await handle (body exit + cleanup + deregistration)
//! ```
//!
//! ## Rules
//! - Cancellation is **cooperative**: the body must poll [`ServiceContext::liveness`]
//!   or await [`ServiceContext::cancelled`]; a body that does neither never stops.
//! - `stop` never re-raises a body failure; read [`Supervisor::captured_error`].
//! - After `stop` returns, every field is stable.
//!
//! [`ServiceContext::liveness`]: crate::ServiceContext::liveness
//! [`ServiceContext::cancelled`]: crate::ServiceContext::cancelled
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use servisor::{Liveness, Registry, ServiceContext, ServiceError, ServiceFn, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::new(Default::default());
//!     let ticker = ServiceFn::arc("ticker", |ctx: ServiceContext| async move {
//!         while ctx.is_live() {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!         }
//!         Ok::<(), ServiceError>(())
//!     });
//!
//!     let sup = Supervisor::builder(ticker).registry(registry.clone()).build();
//!     sup.start()?;
//!     sup.wait_for_live(Duration::from_millis(5)).await;
//!     assert_eq!(sup.liveness(), Liveness::Live);
//!
//!     sup.stop().await?;
//!     assert_eq!(sup.liveness(), Liveness::Finished);
//!     assert!(registry.is_empty());
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures::FutureExt;
use tokio::runtime::Handle;
use tracing::{Instrument, info, info_span};

use crate::core::builder::SupervisorBuilder;
use crate::core::handle::ServiceHandle;
use crate::core::lifecycle::{Lifecycle, Liveness};
use crate::core::registry::Registry;
use crate::core::runner::{self, Finalizer};
use crate::error::{ServiceError, SupervisorError};
use crate::events::EventKind;
use crate::services::ServiceRef;

/// Supervises one run of a service.
///
/// Cheap to clone; clones share the same instance (the registry snapshot
/// hands out such clones).
#[derive(Clone)]
pub struct Supervisor {
    lc: Arc<Lifecycle>,
}

impl Supervisor {
    /// Supervises `service` under its own name in the global registry.
    pub fn new(service: ServiceRef) -> Self {
        Self::builder(service).build()
    }

    /// Starts a builder for custom name and registry.
    pub fn builder(service: ServiceRef) -> SupervisorBuilder {
        SupervisorBuilder::new(service)
    }

    pub(crate) fn from_lifecycle(lc: Arc<Lifecycle>) -> Self {
        Self { lc }
    }

    /// Service name (immutable).
    pub fn name(&self) -> &str {
        &self.lc.name
    }

    /// Diagnostic start index; `None` until started.
    pub fn index(&self) -> Option<u64> {
        self.lc.index()
    }

    /// Registry this supervisor registers into.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.lc.registry
    }

    /// Handle of the spawned service, if started.
    pub fn handle(&self) -> Option<ServiceHandle> {
        self.lc.state().handle.clone()
    }

    /// True once `start` succeeded.
    pub fn is_started(&self) -> bool {
        self.lc.state().index.is_some()
    }

    /// Tri-state liveness derived from the start/end timestamps.
    pub fn liveness(&self) -> Liveness {
        self.lc.liveness()
    }

    /// When the body began executing.
    pub fn started_at(&self) -> Option<SystemTime> {
        self.lc.state().started_at
    }

    /// When a stop was requested or the body completed, whichever came first.
    pub fn ended_at(&self) -> Option<SystemTime> {
        self.lc.state().ended_at
    }

    /// Time between `started_at` and `ended_at`, once both are set.
    pub fn run_time(&self) -> Option<Duration> {
        let st = self.lc.state();
        match (st.started_at, st.ended_at) {
            (Some(start), Some(end)) => Some(end.duration_since(start).unwrap_or_default()),
            _ => None,
        }
    }

    /// Error the body terminated with, if any.
    pub fn captured_error(&self) -> Option<ServiceError> {
        self.lc.state().captured_error.clone()
    }

    /// Error the cleanup hook terminated with, if any.
    pub fn cleanup_error(&self) -> Option<ServiceError> {
        self.lc.state().cleanup_error.clone()
    }

    /// True if both handles point at the same supervised instance.
    pub fn ptr_eq(&self, other: &Supervisor) -> bool {
        Arc::ptr_eq(&self.lc, &other.lc)
    }

    /// Registers the service and spawns its body; does not block.
    ///
    /// On a `current_thread` runtime the body does not run before the caller yields.
    ///
    /// # Errors
    /// - [`SupervisorError::AlreadyStarted`] on a second call (the first run is unaffected).
    /// - [`SupervisorError::NoRuntime`] outside of a tokio runtime.
    pub fn start(&self) -> Result<ServiceHandle, SupervisorError> {
        let (runtime, index) = {
            let mut st = self.lc.state();
            if st.index.is_some() {
                return Err(SupervisorError::AlreadyStarted {
                    name: self.name().to_owned(),
                });
            }
            let runtime = Handle::try_current().map_err(|_| SupervisorError::NoRuntime {
                name: self.name().to_owned(),
            })?;
            let index = self.lc.registry.next_index();
            st.index = Some(index);
            self.lc.registry.register(index, &self.lc);
            (runtime, index)
        };

        info!(service = %self.lc.name, index, "starting service");
        self.lc.publish(self.lc.event(EventKind::ServiceStarting));

        // The state lock is released: a runtime that is shutting down drops the
        // future right away, and the finalizer locks state on drop.
        let fin = Finalizer::new(Arc::clone(&self.lc), index);
        let span = info_span!("service", name = %self.lc.name, index);
        let join = runtime.spawn(runner::run_service(fin).instrument(span));
        let handle = ServiceHandle::new(Arc::clone(&self.lc.name), index, join, Arc::clone(&self.lc.done));
        self.lc.state().handle = Some(handle.clone());
        Ok(handle)
    }

    /// Requests a cooperative stop and waits until the service fully finished.
    ///
    /// No-op if never started; returns immediately if already finished.
    ///
    /// # Errors
    /// [`SupervisorError::Join`] if the service task was aborted (runtime shutdown).
    /// Body failures are **not** returned.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let Some(handle) = self.handle() else {
            return Ok(());
        };
        if self.lc.mark_ended() {
            info!(service = %self.lc.name, index = handle.index(), "stopping service");
            self.lc.publish(self.lc.event(EventKind::ServiceStopRequested));
        }
        self.lc.token.cancel();
        handle.join().await
    }

    /// Starts the service, awaits `f`, then always stops the service.
    ///
    /// The stop runs whether `f` returns `Ok`, returns `Err` or panics (the
    /// panic resumes once the service finished), so the scope never leaks a
    /// running service. An error from `f` takes precedence over a stop error.
    ///
    /// # Errors
    /// Whatever `start` or `f` return, then [`SupervisorError::Join`] from `stop`.
    ///
    /// # Example
    /// ```rust
    /// use std::time::Duration;
    /// use servisor::{Registry, ServiceContext, ServiceError, ServiceFn, Supervisor, SupervisorError};
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() -> Result<(), SupervisorError> {
    ///     let registry = Registry::new(Default::default());
    ///     let svc = ServiceFn::arc("pinger", |ctx: ServiceContext| async move {
    ///         ctx.cancelled().await;
    ///         Ok::<(), ServiceError>(())
    ///     });
    ///     let sup = Supervisor::builder(svc).registry(registry.clone()).build();
    ///
    ///     let live = sup
    ///         .run_scoped(|s| async move {
    ///             s.wait_for_live(Duration::from_millis(1)).await;
    ///             Ok::<_, SupervisorError>(s.liveness())
    ///         })
    ///         .await?;
    ///     assert!(live.is_live());
    ///     assert!(registry.is_empty());
    ///     Ok(())
    /// }
    /// ```
    pub async fn run_scoped<F, Fut, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(Supervisor) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<SupervisorError>,
    {
        self.start()?;
        let outcome = AssertUnwindSafe(f(self.clone())).catch_unwind().await;
        let stopped = self.stop().await;
        match outcome {
            Ok(res) => {
                let value = res?;
                stopped?;
                Ok(value)
            }
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Waits until [`liveness`](Self::liveness) is exactly [`Liveness::Live`].
    ///
    /// Re-checks every `poll_interval` (at least 1ms). Never returns for a
    /// service that is never started or that finishes before it is observed live.
    pub async fn wait_for_live(&self, poll_interval: Duration) {
        let interval = poll_interval.max(Duration::from_millis(1));
        while !self.liveness().is_live() {
            tokio::time::sleep(interval).await;
        }
    }

    /// [`wait_for_live`](Self::wait_for_live) with the registry's configured poll interval.
    pub async fn wait_for_live_default(&self) {
        let interval = self.lc.registry.config().poll_interval_clamped();
        self.wait_for_live(interval).await
    }
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("name", &self.lc.name)
            .field("index", &self.index())
            .field("liveness", &self.liveness())
            .finish()
    }
}
