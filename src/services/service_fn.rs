//! # Closure-backed service (`ServiceFn`)
//!
//! [`ServiceFn`] wraps `F: Fn(ServiceContext) -> Fut`; cleanup is a no-op.
//! Shared state goes in an `Arc<...>` captured by the closure.
//!
//! ```rust
//! use servisor::{ServiceContext, ServiceError, ServiceFn, Service};
//!
//! let svc = ServiceFn::arc("worker", |ctx: ServiceContext| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, ServiceError>(())
//! });
//! assert_eq!(svc.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::services::{Service, ServiceContext};

/// Function-backed service.
#[derive(Debug)]
pub struct ServiceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ServiceFn<F> {
    /// Creates a new function-backed service.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the service behind an `Arc`, ready for [`Supervisor::new`](crate::Supervisor::new).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Service for ServiceFn<F>
where
    F: Fn(ServiceContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
        (self.f)(ctx).await
    }
}
