//! # LogWriter: renders lifecycle events through `tracing`.
//!
//! ```text
//! INFO  service starting service="ticker" index=1
//! ERROR service failed service="ticker" index=1 reason="boom"
//! WARN  services still registered at exit reason="[\"ticker\"]"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that logs every event at a level matching its severity.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let service = e.service.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::ServiceStarting => info!(service, index = e.index, "service starting"),
            EventKind::ServiceLive => debug!(service, index = e.index, "service live"),
            EventKind::ServiceStopRequested => {
                info!(service, index = e.index, "service stop requested")
            }
            EventKind::ServiceStopped => info!(service, index = e.index, "service stopped"),
            EventKind::ServiceFailed => error!(service, index = e.index, reason, "service failed"),
            EventKind::CleanupFailed => error!(service, index = e.index, reason, "cleanup failed"),
            EventKind::RegistryInconsistency => {
                warn!(service, index = e.index, "service missing from registry")
            }
            EventKind::ShutdownRequested => info!("shutdown requested"),
            EventKind::AllStopped => info!("all services stopped"),
            EventKind::GraceExceeded => warn!(reason, "grace period exceeded"),
            EventKind::ExitWithLiveServices => warn!(reason, "services still registered at exit"),
            EventKind::SubscriberOverflow => warn!(subscriber = service, reason, "subscriber overflow"),
            EventKind::SubscriberPanicked => error!(subscriber = service, reason, "subscriber panicked"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
