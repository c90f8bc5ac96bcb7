// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based infrastructure for long-running concerns.
//
// Structure:
// - core/           - Health types shared by the actors
// - infrastructure/ - Health monitor, queue listeners, coordinator
//
// Note: Order logic lives in OrderService, NOT in actors.
//       Actors only host the queue listeners and health reporting.
//
// ============================================================================

// Private module declarations
mod core;
mod infrastructure;

// Re-export what's needed in the public API
pub use self::core::{ComponentHealth, HealthStatus};
pub use infrastructure::{
    CoordinatorActor, GetHealthMonitor, GetSystemHealth, HealthMonitorActor, ListenerSettings,
    QueueListener, Shutdown, SystemHealth, UpdateHealth,
};
