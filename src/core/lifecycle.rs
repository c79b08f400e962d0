//! # Per-instance lifecycle state and the tri-state liveness.
//!
//! ```text
//!                 start()           runner           stop() / body returns     finalize
//!  [Unstarted] ──────────► (registered) ──────► [Live] ──────────────────► [Finished] ──► deregistered
//!  started_at=None          index=Some(n)     started_at=Some   ended_at=Some
//! ```
//!
//! ## Rules
//! - [`Liveness`] is derived from `started_at` / `ended_at` only; there is no separate flag.
//! - `started_at` and `ended_at` are written at most once each.
//! - The state lock is never held across an `.await`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::SystemTime;

use parking_lot::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::core::handle::ServiceHandle;
use crate::core::registry::Registry;
use crate::error::ServiceError;
use crate::events::{Event, EventKind};
use crate::services::ServiceRef;

/// Tri-state liveness of a supervised service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Liveness {
    /// The body has not begun executing.
    Unstarted,
    /// The body is executing and no stop was requested.
    Live,
    /// A stop was requested or the body completed.
    Finished,
}

impl Liveness {
    /// Derives liveness from the two lifecycle timestamps.
    ///
    /// `Unstarted` wins over `Finished`: a service stopped before its body ran
    /// stays `Unstarted` until the runner records `started_at`.
    pub fn from_times(started_at: Option<SystemTime>, ended_at: Option<SystemTime>) -> Self {
        match (started_at, ended_at) {
            (None, _) => Liveness::Unstarted,
            (Some(_), Some(_)) => Liveness::Finished,
            (Some(_), None) => Liveness::Live,
        }
    }

    /// True only for [`Liveness::Live`].
    #[inline]
    pub fn is_live(self) -> bool {
        matches!(self, Liveness::Live)
    }

    /// Short lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Liveness::Unstarted => "unstarted",
            Liveness::Live => "live",
            Liveness::Finished => "finished",
        }
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable fields of one supervisor instance.
#[derive(Default)]
pub(crate) struct State {
    pub(crate) handle: Option<ServiceHandle>,
    pub(crate) index: Option<u64>,
    pub(crate) started_at: Option<SystemTime>,
    pub(crate) ended_at: Option<SystemTime>,
    pub(crate) captured_error: Option<ServiceError>,
    pub(crate) cleanup_error: Option<ServiceError>,
}

/// Shared core of a [`Supervisor`](crate::Supervisor): identity, service, and state.
pub(crate) struct Lifecycle {
    pub(crate) name: Arc<str>,
    pub(crate) service: ServiceRef,
    pub(crate) registry: Arc<Registry>,
    pub(crate) token: CancellationToken,
    pub(crate) done: Arc<AtomicBool>,
    state: Mutex<State>,
}

impl Lifecycle {
    pub(crate) fn new(name: Arc<str>, service: ServiceRef, registry: Arc<Registry>) -> Arc<Self> {
        Arc::new(Self {
            name,
            service,
            registry,
            token: CancellationToken::new(),
            done: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(State::default()),
        })
    }

    #[inline]
    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    pub(crate) fn liveness(&self) -> Liveness {
        let st = self.state.lock();
        Liveness::from_times(st.started_at, st.ended_at)
    }

    pub(crate) fn index(&self) -> Option<u64> {
        self.state.lock().index
    }

    /// Records `started_at` if unset.
    pub(crate) fn mark_started(&self) {
        let mut st = self.state.lock();
        if st.started_at.is_none() {
            st.started_at = Some(SystemTime::now());
        }
    }

    /// Records `ended_at` if unset; returns `true` if this call set it.
    pub(crate) fn mark_ended(&self) -> bool {
        let mut st = self.state.lock();
        if st.ended_at.is_some() {
            return false;
        }
        st.ended_at = Some(SystemTime::now());
        true
    }

    /// True once a stop was requested (`ended_at` set or token cancelled).
    pub(crate) fn stop_requested(&self) -> bool {
        self.token.is_cancelled() || self.state.lock().ended_at.is_some()
    }

    /// Event of `kind` tagged with this service's name and index.
    pub(crate) fn event(&self, kind: EventKind) -> Event {
        let ev = Event::new(kind).with_service(Arc::clone(&self.name));
        match self.index() {
            Some(i) => ev.with_index(i),
            None => ev,
        }
    }

    pub(crate) fn publish(&self, ev: Event) {
        self.registry.bus().publish(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liveness_is_derived_from_timestamps() {
        let t = Some(SystemTime::now());
        assert_eq!(Liveness::from_times(None, None), Liveness::Unstarted);
        assert_eq!(Liveness::from_times(t, None), Liveness::Live);
        assert_eq!(Liveness::from_times(t, t), Liveness::Finished);
        assert_eq!(Liveness::from_times(None, t), Liveness::Unstarted);
    }

    #[test]
    fn only_live_is_live() {
        assert!(Liveness::Live.is_live());
        assert!(!Liveness::Unstarted.is_live());
        assert!(!Liveness::Finished.is_live());
        assert_eq!(Liveness::Finished.to_string(), "finished");
    }
}
