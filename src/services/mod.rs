//! # Service abstractions.
//!
//! - [`Service`]: trait for a cooperative, long-running body with a cleanup hook
//! - [`ServiceFn`]: closure-backed implementation
//! - [`ServiceRef`]: shared reference (`Arc<dyn Service>`)
//! - [`ServiceContext`]: liveness and cancellation handed to the body

mod context;
mod service;
mod service_fn;

pub use context::ServiceContext;
pub use service::{Service, ServiceRef};
pub use service_fn::ServiceFn;
