// Read-only view over the startup credential resolution, for external
// liveness and readiness checks. Never touches the network.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub initialized: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct HealthReporter {
    initialized: bool,
}

impl HealthReporter {
    pub fn new(initialized: bool) -> Self {
        Self { initialized }
    }

    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            initialized: self.initialized,
            timestamp: Utc::now(),
        }
    }
}
