//! Federation tuning options.
//!
//! One options struct carries the per-request knobs: how long any single
//! backend call may take, and how wide the per-phase fan-out may run.

use std::time::Duration;

/// Default per-backend call timeout.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on concurrent backend calls per phase.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Options for all federated read operations.
#[derive(Debug, Clone)]
pub struct FederationOptions {
    /// Upper bound on one backend call. A collection that neither returns nor
    /// fails within this window is treated as a repository-communication
    /// failure for that call.
    pub backend_timeout: Duration,

    /// Upper bound on concurrent backend calls within one phase. Clamped to at
    /// least 1.
    pub max_in_flight: usize,
}

impl Default for FederationOptions {
    fn default() -> Self {
        Self {
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl FederationOptions {
    /// Sets the per-backend call timeout.
    #[must_use]
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Sets the fan-out width.
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let options = FederationOptions::default();
        assert_eq!(options.backend_timeout, DEFAULT_BACKEND_TIMEOUT);
        assert_eq!(options.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
    }

    #[test]
    fn builders_override_fields() {
        let options = FederationOptions::default()
            .with_backend_timeout(Duration::from_millis(250))
            .with_max_in_flight(2);
        assert_eq!(options.backend_timeout, Duration::from_millis(250));
        assert_eq!(options.max_in_flight, 2);
    }
}
