use serde::Deserialize;

use super::aggregate::Order;
use super::errors::OrderError;
use super::value_objects::{line_items, OrderItem, OrderStatus};

// ============================================================================
// Order Requests - Client intent at the inbound boundary
// ============================================================================

/// Largest quantity accepted for one product in a single order.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// A client's order request. Identity, totals and timestamps are never
/// taken from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrder {
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<ItemRequest>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PlaceOrder {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for item in &self.items {
            if item.product_id.trim().is_empty() {
                return Err(OrderError::EmptyProductId);
            }
            if item.quantity <= 0 || item.quantity > MAX_ITEM_QUANTITY {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
        }

        if let Some(status) = &self.status {
            OrderStatus::from_name(status)?;
        }

        Ok(())
    }

    /// Validate and convert into an order draft with unresolved products.
    pub fn into_order(self) -> Result<Order, OrderError> {
        self.validate()?;

        let items = line_items(
            self.items
                .into_iter()
                .map(|item| OrderItem::unresolved(item.product_id, item.quantity)),
        );

        // Repeated product ids are merged, so the cap applies to the sum too.
        if let Some(item) = items.values().find(|item| item.quantity > MAX_ITEM_QUANTITY) {
            return Err(OrderError::InvalidQuantity(item.quantity));
        }

        Ok(Order::draft(self.customer_id, items))
    }
}
