//! # Example: graceful_shutdown
//!
//! Several services in the process-wide registry, stopped together on Ctrl-C
//! (or SIGTERM/SIGQUIT on unix).
//!
//! Demonstrates how to:
//! - Use [`Supervisor::new`] with the global registry.
//! - Mix polling bodies and token-driven bodies.
//! - Wait with [`Registry::run_until_signal`] and report leftovers with [`Registry::exit_guard`].
//!
//! ## Flow
//! ```text
//! main
//!  ├─► exit_guard()                (reports leftovers when main returns)
//!  ├─► start poller / listener
//!  └─► run_until_signal()
//!        ├─► publish(ShutdownRequested)
//!        └─► stop_all_within(Config::grace)
//!              ├─► stop() each, concurrently
//!              └─► publish(AllStopped)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example graceful_shutdown
//! # press Ctrl-C
//! ```

use std::time::Duration;

use servisor::{Registry, ServiceContext, ServiceError, ServiceFn, Supervisor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let registry = Registry::global();
    let _exit = registry.exit_guard();

    // Polls liveness between units of work.
    let poller = ServiceFn::arc("poller", |ctx: ServiceContext| async move {
        while ctx.is_live() {
            println!("[poller] working");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        Ok::<(), ServiceError>(())
    });

    // Waits on the cancellation token instead of polling.
    let listener = ServiceFn::arc("listener", |ctx: ServiceContext| async move {
        let mut accepted = 0u64;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    println!("[listener] closing after {accepted} connections");
                    return Err(ServiceError::Canceled);
                }
                _ = tokio::time::sleep(Duration::from_millis(700)) => accepted += 1,
            }
        }
    });

    Supervisor::new(poller).start()?;
    Supervisor::new(listener).start()?;
    println!("running {:?}; press Ctrl-C to stop", registry.names());

    registry.run_until_signal().await?;
    println!("all services stopped");
    Ok(())
}
