// ============================================================================
// Order Service
// ============================================================================
//
// Order lifecycle for a food ordering platform: creation with catalog-priced
// totals, checkout hand-off to payment, and status updates driven by payment
// results arriving on the broker.
//
// ============================================================================

pub mod actors;
pub mod config;
pub mod domain;
pub mod integration;
pub mod messaging;
pub mod metrics;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
