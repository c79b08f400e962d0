//! # Registry-wide configuration.
//!
//! [`Config`] is passed to [`Registry::new`](crate::Registry::new) /
//! [`Registry::builder`](crate::Registry::builder); the global registry uses
//! `Config::default()`.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `poll_interval = 0s` → clamped to 1ms (a zero sleep would never yield)

use std::time::Duration;

/// Settings shared by every supervisor of one registry.
///
/// All fields are public; prefer the helper accessors over sprinkling clamps.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum wait used by [`Registry::run_until_signal`](crate::Registry::run_until_signal)
    /// before giving up on stuck services.
    pub grace: Duration,

    /// Capacity of the event bus ring buffer.
    ///
    /// Receivers lagging more than this many events observe `Lagged` and skip ahead.
    pub bus_capacity: usize,

    /// Default interval for [`Supervisor::wait_for_live_default`](crate::Supervisor::wait_for_live_default).
    pub poll_interval: Duration,
}

impl Config {
    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }
}

impl Default for Config {
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    /// - `poll_interval = 50ms`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
            poll_interval: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.grace, Duration::from_secs(60));
        assert_eq!(cfg.bus_capacity, 1024);
        assert_eq!(cfg.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn sentinels_are_clamped() {
        let cfg = Config {
            grace: Duration::ZERO,
            bus_capacity: 0,
            poll_interval: Duration::ZERO,
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.poll_interval_clamped(), Duration::from_millis(1));
    }
}
