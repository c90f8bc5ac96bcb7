// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// - Health monitoring
// - Inbound queue listeners
// - Coordination and shutdown
//
// ============================================================================

// Private module declarations
mod coordinator;
mod health_monitor;
mod queue_listener;

// Re-export for public API
pub use coordinator::{CoordinatorActor, GetHealthMonitor, ListenerSettings, Shutdown};
pub use health_monitor::{GetSystemHealth, HealthMonitorActor, SystemHealth, UpdateHealth};
pub use queue_listener::QueueListener;
