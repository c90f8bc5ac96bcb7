// ============================================================================
// Order Domain - Business Logic for the Order Lifecycle
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderStatus, Product, OrderItem, LineItems)
// - Aggregate (Order with total computation and transition checks)
// - Commands (PlaceOrder, the validated inbound request)
// - Events (OrderCreated, OrderPaymentPending)
// - Errors (OrderError, ServiceError and collaborator errors)
// - Ports (repository, catalog, publisher, payment, checkout hand-off)
// - Checkout hand-offs (queue, payment)
// - Service (OrderService)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod ports;
pub mod checkout;
pub mod service;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use ports::*;
pub use checkout::*;
pub use service::*;
