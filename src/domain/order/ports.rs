use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::Order;
use super::errors::{IntegrationError, RepositoryError, ServiceError};
use super::value_objects::{LineItems, OrderStatus};

// ============================================================================
// Ports - Collaborators the order service depends on
// ============================================================================

/// Order document store.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// `Ok(None)` when no order has this id.
    async fn get_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError>;

    async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepositoryError>;

    async fn create(&self, order: &Order) -> Result<Order, RepositoryError>;

    /// Replace the stored document under `id`.
    async fn update(&self, id: &str, order: &Order) -> Result<(), RepositoryError>;

    /// Write only status and update time.
    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

/// Resolves product metadata for line items.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fill name, price and category of every item in place.
    async fn get_products(&self, items: &mut LineItems) -> Result<(), IntegrationError>;
}

/// Broker producer.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, destination: &str, key: &str, payload: &str) -> Result<(), IntegrationError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_type: i32,
    pub order_id: String,
}

/// Synchronous payment service.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment record. `idempotency_key` identifies retries of the
    /// same checkout.
    async fn create_payment(&self, payment: &Payment, idempotency_key: &str) -> Result<(), IntegrationError>;
}

/// The external side effect performed when an order is checked out.
#[async_trait]
pub trait CheckoutHandoff: Send + Sync {
    fn name(&self) -> &'static str;

    async fn hand_off(&self, order: &Order) -> Result<(), ServiceError>;

    /// Error reported when the hand-off exceeds the call timeout.
    fn timed_out(&self) -> ServiceError;
}
