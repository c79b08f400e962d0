mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use servisor::{
    EventKind, Registry, RuntimeError, Service, ServiceContext, ServiceError, ServiceFn,
    Supervisor,
};
use tokio::time::sleep;

use common::{Stubborn, Ticker, registry, supervise};

#[tokio::test(start_paused = true)]
async fn stop_all_drains_five_services() {
    let reg = registry();
    let services: Vec<Arc<Ticker>> = (0..5).map(|_| Arc::new(Ticker::default())).collect();
    let sups: Vec<Supervisor> = services.iter().map(|s| supervise(s.clone(), &reg)).collect();
    assert_eq!(reg.len(), 0);

    for sup in &sups {
        sup.start().expect("start");
    }
    assert_eq!(reg.len(), 5);

    let before = reg.snapshot();
    sleep(Duration::from_millis(600)).await;
    reg.stop_all().await.expect("stop_all");

    assert_eq!(reg.len(), 0);
    assert_eq!(before.len(), 5, "snapshot is a copy");
    for (svc, sup) in services.iter().zip(&sups) {
        assert_eq!(svc.cleanups(), 1);
        assert!(sup.handle().expect("handle").is_finished());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_all_drains_on_a_multi_thread_runtime() {
    let reg = registry();
    let services: Vec<Arc<Ticker>> = (0..8).map(|_| Arc::new(Ticker::default())).collect();
    for svc in &services {
        supervise(svc.clone(), &reg).start().expect("start");
    }

    for sup in reg.snapshot() {
        sup.wait_for_live(Duration::from_millis(1)).await;
    }
    reg.stop_all().await.expect("stop_all");

    assert!(reg.is_empty());
    assert!(services.iter().all(|s| s.cleanups() == 1));
}

#[tokio::test(start_paused = true)]
async fn names_and_snapshot_follow_start_order() {
    let reg = registry();
    let first = Supervisor::builder(Arc::new(Ticker::default()))
        .name("first")
        .registry(reg.clone())
        .build();
    let second = Supervisor::builder(Arc::new(Ticker::default()))
        .name("second")
        .registry(reg.clone())
        .build();

    first.start().expect("start first");
    second.start().expect("start second");
    assert_eq!(reg.names(), vec!["first", "second"]);

    first.stop().await.expect("stop first");
    assert_eq!(reg.names(), vec!["second"]);
    let snap = reg.snapshot();
    assert_eq!(snap.len(), 1);
    assert!(snap[0].ptr_eq(&second));

    reg.stop_all().await.expect("stop_all");
    assert!(reg.names().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_all_within_reports_stuck_services() {
    let reg = registry();
    let mut rx = reg.bus().subscribe();
    let sup = supervise(Arc::new(Stubborn), &reg);
    sup.start().expect("start");

    let err = reg
        .stop_all_within(Duration::from_secs(1))
        .await
        .expect_err("stubborn service cannot stop");
    match err {
        RuntimeError::GraceExceeded { grace, stuck } => {
            assert_eq!(grace, Duration::from_secs(1));
            assert_eq!(stuck, vec!["Stubborn"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    assert!(kinds.contains(&EventKind::GraceExceeded));
    assert_eq!(reg.len(), 1);
}

/// Starts a replacement service in the same registry from its cleanup hook.
struct Respawner {
    registry: Arc<Registry>,
}

#[async_trait]
impl Service for Respawner {
    async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
        ctx.cancelled().await;
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), ServiceError> {
        let svc = ServiceFn::arc("respawned", |ctx: ServiceContext| async move {
            ctx.cancelled().await;
            Ok::<(), ServiceError>(())
        });
        Supervisor::builder(svc)
            .registry(self.registry.clone())
            .build()
            .start()
            .map_err(|e| ServiceError::failed(e.to_string()))?;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn stop_all_detects_late_registrations() {
    let reg = registry();
    let respawner = Arc::new(Respawner {
        registry: reg.clone(),
    });
    supervise(respawner, &reg).start().expect("start");

    let err = reg.stop_all().await.expect_err("late registration");
    match err {
        RuntimeError::RegistryNotEmpty { remaining } => assert_eq!(remaining, vec!["respawned"]),
        other => panic!("unexpected error: {other:?}"),
    }

    reg.stop_all().await.expect("second stop_all");
    assert!(reg.is_empty());
}

#[tokio::test(start_paused = true)]
async fn exit_guard_reports_leftovers() {
    let reg = registry();
    let mut rx = reg.bus().subscribe();
    let sup = supervise(Arc::new(Ticker::default()), &reg);
    sup.start().expect("start");

    let guard = reg.exit_guard();
    assert_eq!(guard.leftovers(), vec!["Ticker"]);
    drop(guard);

    let report = loop {
        let ev = rx.recv().await.expect("bus open");
        if ev.kind == EventKind::ExitWithLiveServices {
            break ev;
        }
    };
    assert!(report.reason.as_deref().is_some_and(|r| r.contains("Ticker")));

    reg.stop_all().await.expect("stop_all");
    assert!(reg.exit_guard().leftovers().is_empty());
}
