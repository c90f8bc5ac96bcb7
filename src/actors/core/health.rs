use chrono::{DateTime, Utc};

use crate::utils::CircuitState;

// ============================================================================
// Health Abstractions
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Health of a dependency guarded by a circuit breaker.
    pub fn from_circuit(state: CircuitState) -> Self {
        match state {
            CircuitState::Closed => HealthStatus::Healthy,
            CircuitState::HalfOpen => HealthStatus::Degraded("Circuit breaker half-open".to_string()),
            CircuitState::Open => HealthStatus::Unhealthy("Circuit breaker open".to_string()),
        }
    }
}

/// Health information for a component
#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_state_mapping() {
        assert!(HealthStatus::from_circuit(CircuitState::Closed).is_healthy());
        assert!(matches!(
            HealthStatus::from_circuit(CircuitState::HalfOpen),
            HealthStatus::Degraded(_)
        ));
        assert!(matches!(
            HealthStatus::from_circuit(CircuitState::Open),
            HealthStatus::Unhealthy(_)
        ));
    }
}
