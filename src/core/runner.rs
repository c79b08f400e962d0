//! # Body execution wrapper.
//!
//! Runs one service body and its finalization path. Spawned by
//! [`Supervisor::start`](crate::Supervisor::start); never called directly.
//!
//! ## Flow
//! ```text
//! started_at = now ──► publish ServiceLive
//!        │
//!        ▼
//! service.run(ctx)  (panics caught)
//!        ├─ Ok / Err(Canceled) after stop ─► nothing captured
//!        └─ Err(e) / panic                ─► captured_error = e, publish ServiceFailed
//!        │
//!        ▼  (every path)
//! ended_at = now (if unset)
//! service.cleanup()  (errors and panics ─► cleanup_error, publish CleanupFailed)
//! drop(Finalizer):
//!     registry.deregister(index)  (absent ─► warn, publish RegistryInconsistency)
//!     done = true ──► publish ServiceStopped
//! ```
//!
//! ## Rules
//! - The spawned task always completes normally; failures never reach the scheduler.
//! - `cleanup` runs at most once, and deregistration happens even if it fails.
//! - [`Finalizer`] is moved into the future by `start`, so a task dropped before
//!   it finishes (abort, runtime shutdown, never polled) still deregisters.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::core::lifecycle::Lifecycle;
use crate::error::ServiceError;
use crate::events::EventKind;
use crate::services::ServiceContext;

/// Deregisters a started service exactly once, when dropped.
pub(crate) struct Finalizer {
    lc: Arc<Lifecycle>,
    index: u64,
    cleaned: bool,
}

impl Finalizer {
    pub(crate) fn new(lc: Arc<Lifecycle>, index: u64) -> Self {
        Self {
            lc,
            index,
            cleaned: false,
        }
    }
}

impl Drop for Finalizer {
    fn drop(&mut self) {
        let lc = &self.lc;
        if !self.cleaned {
            lc.mark_ended();
            let err = ServiceError::failed("service task aborted before cleanup");
            warn!(service = %lc.name, index = self.index, "service task dropped before cleanup");
            lc.publish(lc.event(EventKind::CleanupFailed).with_reason(err.to_string()));
            lc.state().cleanup_error = Some(err);
        }

        if !lc.registry.deregister(self.index) {
            warn!(service = %lc.name, index = self.index, "service was not found in its registry");
            lc.publish(lc.event(EventKind::RegistryInconsistency));
        }

        lc.done.store(true, Ordering::Release);
        debug!(service = %lc.name, "service has stopped");
        lc.publish(lc.event(EventKind::ServiceStopped));
    }
}

/// Executes the body guarded by `fin`, then finalizes it.
pub(crate) async fn run_service(mut fin: Finalizer) {
    let lc = Arc::clone(&fin.lc);
    lc.mark_started();
    debug!("service is live");
    lc.publish(lc.event(EventKind::ServiceLive));

    let ctx = ServiceContext::new(Arc::clone(&lc), fin.index);
    match guarded(lc.service.run(ctx)).await {
        Ok(()) => {}
        Err(ServiceError::Canceled) if lc.stop_requested() => {}
        Err(err) => {
            error!(error = %err, label = err.as_label(), "service failed");
            lc.publish(lc.event(EventKind::ServiceFailed).with_reason(err.to_string()));
            lc.state().captured_error = Some(err);
        }
    }

    lc.mark_ended();
    debug!("closing service");
    if let Err(err) = guarded(lc.service.cleanup()).await {
        error!(error = %err, "service cleanup failed");
        lc.publish(lc.event(EventKind::CleanupFailed).with_reason(err.to_string()));
        lc.state().cleanup_error = Some(err);
    }
    fin.cleaned = true;
}

/// Awaits `fut`, turning a panic into [`ServiceError::Panicked`].
async fn guarded<F>(fut: F) -> Result<(), ServiceError>
where
    F: Future<Output = Result<(), ServiceError>>,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(ServiceError::from_panic(payload)))
}
