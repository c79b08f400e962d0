//! # Context handed to a service body.
//!
//! Carries the two cancellation views of one supervised run:
//! - [`ServiceContext::liveness`]: the tri-state derived from start/end timestamps;
//! - [`ServiceContext::token`]: a [`CancellationToken`] cancelled by `stop`,
//!   for bodies that prefer to `select!` on cancellation instead of polling.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::{Lifecycle, Liveness};

/// Liveness and cancellation view of the running service.
#[derive(Clone)]
pub struct ServiceContext {
    lc: Arc<Lifecycle>,
    index: u64,
}

impl ServiceContext {
    pub(crate) fn new(lc: Arc<Lifecycle>, index: u64) -> Self {
        Self { lc, index }
    }

    /// Name of the supervised service.
    pub fn name(&self) -> &str {
        &self.lc.name
    }

    /// Diagnostic start index.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Current liveness of this run.
    pub fn liveness(&self) -> Liveness {
        self.lc.liveness()
    }

    /// True while the body should keep working.
    pub fn is_live(&self) -> bool {
        self.liveness().is_live()
    }

    /// Cancellation token cancelled by `stop`.
    pub fn token(&self) -> &CancellationToken {
        &self.lc.token
    }

    /// Completes once `stop` was requested.
    pub async fn cancelled(&self) {
        self.lc.token.cancelled().await
    }
}

impl fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContext")
            .field("name", &self.lc.name)
            .field("index", &self.index)
            .field("liveness", &self.liveness())
            .finish()
    }
}
