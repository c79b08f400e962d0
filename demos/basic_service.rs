//! # Example: basic_service
//!
//! One ticking service under an isolated registry with the built-in [`LogWriter`].
//!
//! Demonstrates how to:
//! - Implement [`Service`] with a body and a cleanup hook.
//! - Attach [`LogWriter`] through [`Registry::builder`].
//! - Start, wait until live, stop, and read the outcome.
//!
//! ## Flow
//! ```text
//! Supervisor::start()
//!     ├─► publish(ServiceStarting)
//!     └─► runner
//!           ├─► publish(ServiceLive)
//!           ├─► Ticker::run() ... ticks while live
//! Supervisor::stop()
//!     ├─► publish(ServiceStopRequested)
//!     └─► runner
//!           ├─► Ticker::cleanup()
//!           └─► publish(ServiceStopped)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic_service --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use servisor::{
    Config, LogWriter, Registry, Service, ServiceContext, ServiceError, Subscribe, Supervisor,
};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Ticker {
    ticks: Mutex<Vec<u32>>,
}

#[async_trait]
impl Service for Ticker {
    async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
        let mut n = 0;
        while ctx.is_live() {
            tracing::info!(tick = n, "tick");
            self.ticks.lock().push(n);
            n += 1;
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), ServiceError> {
        tracing::info!(total = self.ticks.lock().len(), "ticker cleaned up");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 1. Registry with a logging subscriber
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let registry = Registry::builder(Config::default())
        .with_subscribers(subs)
        .build();

    // 2. Supervise the ticker
    let ticker = Arc::new(Ticker::default());
    let sup = Supervisor::builder(ticker.clone())
        .registry(registry.clone())
        .build();

    // 3. Run for a while
    sup.start()?;
    sup.wait_for_live_default().await;
    tokio::time::sleep(Duration::from_millis(2_900)).await;

    // 4. Stop and inspect
    sup.stop().await?;
    println!(
        "ticks={:?} liveness={} run_time={:?} error={:?}",
        ticker.ticks.lock(),
        sup.liveness(),
        sup.run_time(),
        sup.captured_error(),
    );
    anyhow::ensure!(registry.is_empty(), "registry should be drained");
    Ok(())
}
