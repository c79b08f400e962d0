//! # The service body contract.
//!
//! A [`Service`] has a name, a body ([`Service::run`]) and an optional
//! [`Service::cleanup`] hook. The body receives a [`ServiceContext`] and must
//! observe it at bounded intervals; otherwise `Supervisor::stop` waits forever.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::services::ServiceContext;

/// Shared handle to a service (`Arc<dyn Service>`).
pub type ServiceRef = Arc<dyn Service>;

/// # Cooperative long-running unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use servisor::{Service, ServiceContext, ServiceError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Service for Heartbeat {
///     async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
///         while ctx.is_live() {
///             // send a heartbeat ...
///             tokio::time::sleep(std::time::Duration::from_secs(1)).await;
///         }
///         Ok(())
///     }
/// }
///
/// assert_eq!(Heartbeat.name(), "Heartbeat");
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Default supervisor name: the implementing type's name without its module path.
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }

    /// The body. Runs once per supervisor.
    ///
    /// Returning `Err(ServiceError::Canceled)` counts as a graceful exit.
    async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError>;

    /// Releases resources. Called exactly once after the body ended, on every path.
    async fn cleanup(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// `a::b::Type<c::D>` → `Type`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    #[allow(dead_code)]
    struct Generic<T>(T);

    #[test]
    fn short_names_strip_paths_and_generics() {
        assert_eq!(short_type_name::<Plain>(), "Plain");
        assert_eq!(short_type_name::<Generic<std::string::String>>(), "Generic");
        assert_eq!(short_type_name::<u32>(), "u32");
    }
}
