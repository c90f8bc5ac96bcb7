// ============================================================================
// Order Store - Persistence Adapters
// ============================================================================
//
// Implementations of the OrderRepository port:
// - memory  - process-local map, used for tests and `STORAGE=memory`
// - scylla  - JSON order documents in ScyllaDB with an indexed status column
//
// ============================================================================

pub mod memory;
pub mod scylla;

pub use memory::InMemoryOrderRepository;
pub use scylla::ScyllaOrderRepository;
