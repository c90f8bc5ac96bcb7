// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order lifecycle: entity, status table, ports and the service that
// orchestrates them. Infrastructure adapters live in store/, integration/
// and messaging/.
//
// ============================================================================

pub mod order;
