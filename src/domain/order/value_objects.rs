use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Product metadata as resolved by the catalog.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub product: Product,
    pub quantity: i64,
}

impl OrderItem {
    /// An item that only references a product; name, price and category are
    /// filled in by catalog enrichment.
    pub fn unresolved(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product: Product {
                id: product_id.into(),
                ..Product::default()
            },
            quantity,
        }
    }

    /// `None` when price x quantity does not fit a Decimal.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.product.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Line items of an order, unique by product id.
pub type LineItems = BTreeMap<String, OrderItem>;

/// Collect items into a set keyed by product id. Repeated product ids are
/// merged by summing their quantities; the sum saturates at `i64::MAX`.
pub fn line_items<I>(items: I) -> LineItems
where
    I: IntoIterator<Item = OrderItem>,
{
    let mut set = LineItems::new();
    for item in items {
        match set.get_mut(&item.product.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => {
                set.insert(item.product.id.clone(), item);
            }
        }
    }
    set
}

// ============================================================================
// Order Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Received,
    PaymentPending,
    Payed,
    Preparing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Received,
        OrderStatus::PaymentPending,
        OrderStatus::Payed,
        OrderStatus::Preparing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Storage code of the status.
    pub fn code(self) -> i32 {
        match self {
            OrderStatus::Received => 0,
            OrderStatus::PaymentPending => 1,
            OrderStatus::Payed => 2,
            OrderStatus::Preparing => 3,
            OrderStatus::Completed => 4,
            OrderStatus::Cancelled => 5,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, OrderError> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(OrderError::UnknownStatusCode(code))
    }

    /// Name used at the inbound boundary and for display.
    pub fn name(self) -> &'static str {
        match self {
            OrderStatus::Received => "RECEIVED",
            OrderStatus::PaymentPending => "PAYMENT_PENDING",
            OrderStatus::Payed => "PAYED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, OrderError> {
        Self::ALL
            .into_iter()
            .find(|status| status.name() == name)
            .ok_or_else(|| OrderError::UnknownStatus(name.to_string()))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Lifecycle table: forward one step at a time, or cancel from any
    /// non-terminal state.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        match (self, next) {
            (from, Cancelled) => !from.is_terminal(),
            (Received, PaymentPending)
            | (PaymentPending, Payed)
            | (Payed, Preparing)
            | (Preparing, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
