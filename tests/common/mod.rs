#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use servisor::{Config, Registry, Service, ServiceContext, ServiceError, Supervisor};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn registry() -> Arc<Registry> {
    init_tracing();
    Registry::new(Config::default())
}

pub fn supervise(svc: Arc<impl Service>, registry: &Arc<Registry>) -> Supervisor {
    Supervisor::builder(svc).registry(registry.clone()).build()
}

/// Appends 0, 1, 2, ... every 250ms while live.
#[derive(Default)]
pub struct Ticker {
    pub results: Mutex<Vec<u32>>,
    pub cleanups: AtomicUsize,
}

impl Ticker {
    pub fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Service for Ticker {
    async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
        let mut next = 0;
        while ctx.is_live() {
            self.results.lock().push(next);
            next += 1;
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), ServiceError> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fails (or panics) on its first instruction.
pub struct Failing {
    pub panic: bool,
    pub cleanups: AtomicUsize,
}

impl Failing {
    pub fn erroring() -> Arc<Self> {
        Arc::new(Self {
            panic: false,
            cleanups: AtomicUsize::new(0),
        })
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            panic: true,
            cleanups: AtomicUsize::new(0),
        })
    }

    pub fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Service for Failing {
    async fn run(&self, _ctx: ServiceContext) -> Result<(), ServiceError> {
        if self.panic {
            panic!("kaboom");
        }
        Err(ServiceError::failed("boom"))
    }

    async fn cleanup(&self) -> Result<(), ServiceError> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Never looks at its context.
pub struct Stubborn;

#[async_trait]
impl Service for Stubborn {
    async fn run(&self, _ctx: ServiceContext) -> Result<(), ServiceError> {
        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
