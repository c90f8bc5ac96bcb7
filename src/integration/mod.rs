// ============================================================================
// Integration - HTTP clients for the catalog and payment services
// ============================================================================

pub mod catalog;
pub mod payment;

pub use catalog::HttpProductCatalog;
pub use payment::HttpPaymentGateway;
