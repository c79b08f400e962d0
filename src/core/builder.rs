//! Builders for [`Supervisor`] and [`Registry`].

use std::borrow::Cow;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::{config::Config, lifecycle::Lifecycle, registry::Registry, supervisor::Supervisor};
use crate::events::Bus;
use crate::services::ServiceRef;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for a [`Supervisor`] with a custom name or registry.
pub struct SupervisorBuilder {
    service: ServiceRef,
    name: Option<Cow<'static, str>>,
    registry: Option<Arc<Registry>>,
}

impl SupervisorBuilder {
    /// Creates a builder for `service`.
    pub fn new(service: ServiceRef) -> Self {
        Self {
            service,
            name: None,
            registry: None,
        }
    }

    /// Overrides the name (defaults to [`Service::name`](crate::Service::name)).
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Registers into `registry` instead of [`Registry::global`].
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds the (unstarted) supervisor.
    pub fn build(self) -> Supervisor {
        let name: Arc<str> = match self.name {
            Some(n) => Arc::from(n.as_ref()),
            None => Arc::from(self.service.name()),
        };
        let registry = self.registry.unwrap_or_else(Registry::global);
        Supervisor::from_lifecycle(Lifecycle::new(name, self.service, registry))
    }
}

/// Builder for a [`Registry`] with event subscribers.
pub struct RegistryBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RegistryBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Each gets a dedicated worker with a bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the registry.
    ///
    /// With subscribers attached this spawns the fan-out listener and the
    /// subscriber workers, so it must be called within a tokio runtime. The
    /// listener stops when the registry is dropped.
    pub fn build(self) -> Arc<Registry> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            Some(spawn_listener(&bus, set))
        };
        Registry::with_bus(self.cfg, bus, listener)
    }
}

/// Forwards bus events to `set` until the returned guard is dropped.
fn spawn_listener(bus: &Bus, set: SubscriberSet) -> DropGuard {
    let mut rx = bus.subscribe();
    let token = CancellationToken::new();
    let stop = token.clone();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
        set.shutdown().await;
    });
    token.drop_guard()
}
