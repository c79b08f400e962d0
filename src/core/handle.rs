//! # Handle to a started service.
//!
//! [`ServiceHandle`] is returned by [`Supervisor::start`](crate::Supervisor::start)
//! and retained by the supervisor forever (a present handle is what forbids a
//! second start). It is cloneable: every clone can await the same completion.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::task::JoinHandle;

use crate::error::SupervisorError;

type JoinFuture = Shared<BoxFuture<'static, Result<(), Arc<str>>>>;

/// Cloneable completion handle of one spawned service.
#[derive(Clone)]
pub struct ServiceHandle {
    name: Arc<str>,
    index: u64,
    join: JoinFuture,
    done: Arc<AtomicBool>,
}

impl ServiceHandle {
    pub(crate) fn new(name: Arc<str>, index: u64, join: JoinHandle<()>, done: Arc<AtomicBool>) -> Self {
        let join = join
            .map(|res| res.map_err(|e| Arc::<str>::from(e.to_string())))
            .boxed()
            .shared();
        Self {
            name,
            index,
            join,
            done,
        }
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Diagnostic start index.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// True once finalization (cleanup + deregistration) has completed.
    pub fn is_finished(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Waits for the spawned service task to complete.
    ///
    /// Body failures are not reported here; they are captured by the supervisor.
    /// Returns [`SupervisorError::Join`] only if the task itself was aborted.
    pub async fn join(&self) -> Result<(), SupervisorError> {
        self.join
            .clone()
            .await
            .map_err(|reason| SupervisorError::Join {
                name: self.name.to_string(),
                reason: reason.to_string(),
            })
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("finished", &self.is_finished())
            .finish()
    }
}
