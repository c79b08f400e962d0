//! Error types used by supervisors, registries and service bodies.
//!
//! This module defines three enums:
//!
//! - [`ServiceError`]: failures raised by a service body or its cleanup hook.
//! - [`SupervisorError`]: misuse or join failures of a single [`Supervisor`](crate::Supervisor).
//! - [`RuntimeError`]: failures of registry-wide operations such as `stop_all`.
//!
//! All three provide `as_label` (stable snake_case, for logs/metrics) and
//! `as_message` helpers.

use std::any::Any;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by a service body or its cleanup hook.
///
/// A body returning one of these never crashes the host process: the supervisor
/// stores it (see [`Supervisor::captured_error`](crate::Supervisor::captured_error))
/// and completes its finalization path as usual.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Body (or cleanup) failed with an error.
    #[error("service failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Body (or cleanup) panicked; the payload was caught by the supervisor.
    #[error("service panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Body observed cancellation and exited; treated as a graceful stop.
    #[error("service cancelled")]
    Canceled,
}

impl ServiceError {
    /// Shorthand for [`ServiceError::Failed`].
    ///
    /// # Example
    /// ```
    /// use servisor::ServiceError;
    ///
    /// let err = ServiceError::failed("connection refused");
    /// assert_eq!(err.to_string(), "service failed: connection refused");
    /// ```
    pub fn failed(error: impl Into<String>) -> Self {
        ServiceError::Failed {
            error: error.into(),
        }
    }

    /// Converts a caught panic payload into [`ServiceError::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        ServiceError::Panicked {
            info: panic_message(payload.as_ref()),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Failed { .. } => "service_failed",
            ServiceError::Panicked { .. } => "service_panicked",
            ServiceError::Canceled => "service_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Failed { error } => format!("error: {error}"),
            ServiceError::Panicked { info } => format!("panic: {info}"),
            ServiceError::Canceled => "cancelled".to_string(),
        }
    }
}

/// # Errors produced by a single supervisor.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// `start` was called on an instance that already has a task handle.
    ///
    /// One supervisor runs its service once; build a new one to run again.
    #[error("service {name:?} was already started")]
    AlreadyStarted {
        /// Name of the service.
        name: String,
    },

    /// `start` was called outside of a tokio runtime.
    #[error("service {name:?} cannot start: no tokio runtime is running")]
    NoRuntime {
        /// Name of the service.
        name: String,
    },

    /// The spawned service task could not be joined (aborted by runtime shutdown).
    #[error("service {name:?} task could not be joined: {reason}")]
    Join {
        /// Name of the service.
        name: String,
        /// Join failure as reported by tokio.
        reason: String,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servisor::SupervisorError;
    ///
    /// let err = SupervisorError::AlreadyStarted { name: "ticker".into() };
    /// assert_eq!(err.as_label(), "supervisor_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::AlreadyStarted { .. } => "supervisor_already_started",
            SupervisorError::NoRuntime { .. } => "supervisor_no_runtime",
            SupervisorError::Join { .. } => "supervisor_join_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::AlreadyStarted { name } => format!("already started: {name}"),
            SupervisorError::NoRuntime { name } => format!("no runtime for: {name}"),
            SupervisorError::Join { name, reason } => format!("join {name}: {reason}"),
        }
    }
}

/// # Errors produced by registry-wide operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// One or more `stop` calls issued by `stop_all` failed.
    ///
    /// Reported only after every member has been awaited.
    #[error("{} service(s) failed to stop: {failures:?}", failures.len())]
    StopFailed {
        /// Per-service failures, in registry order.
        failures: Vec<SupervisorError>,
    },

    /// Services were still registered after every snapshot member finished.
    ///
    /// Means a service registered concurrently with `stop_all` or never deregistered.
    #[error("registry not empty after stop_all; remaining: {remaining:?}")]
    RegistryNotEmpty {
        /// Names of the services still registered.
        remaining: Vec<String>,
    },

    /// Shutdown grace period was exceeded; some services did not finish in time.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the services still registered at the deadline.
        stuck: Vec<String>,
    },

    /// Installing OS signal listeners failed.
    #[error("failed to listen for shutdown signals: {error}")]
    Signal {
        /// The underlying I/O error message.
        error: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::StopFailed { .. } => "runtime_stop_failed",
            RuntimeError::RegistryNotEmpty { .. } => "runtime_registry_not_empty",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal { .. } => "runtime_signal_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::StopFailed { failures } => {
                let names: Vec<String> = failures.iter().map(|f| f.as_message()).collect();
                format!("stop failed: {names:?}")
            }
            RuntimeError::RegistryNotEmpty { remaining } => {
                format!("still registered: {remaining:?}")
            }
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck services={stuck:?}")
            }
            RuntimeError::Signal { error } => format!("signal: {error}"),
        }
    }
}

/// Renders a panic payload (`&str`, `String` or anything else) as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
