use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::{LineItems, OrderStatus};

// ============================================================================
// Order - Domain Entity
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: String,
    pub customer_id: String,

    // Current State
    pub status: OrderStatus,
    pub items: LineItems,
    pub total: Decimal,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// A not-yet-persisted order. Identity, status and timestamps are
    /// assigned by the service on creation.
    pub fn draft(customer_id: impl Into<String>, items: LineItems) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            customer_id: customer_id.into(),
            status: OrderStatus::Received,
            items,
            total: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of price x quantity over all line items, rounded to cents.
    pub fn calculate_total(&self) -> Result<Decimal, OrderError> {
        let total = self.items.values().try_fold(Decimal::ZERO, |acc, item| {
            item.subtotal()
                .and_then(|subtotal| acc.checked_add(subtotal))
                .ok_or(OrderError::TotalOverflow)
        })?;

        Ok(total.round_dp(2))
    }

    pub fn recompute_total(&mut self) -> Result<(), OrderError> {
        self.total = self.calculate_total()?;
        Ok(())
    }

    /// Validate a status change against the lifecycle table.
    pub fn ensure_transition(&self, next: OrderStatus) -> Result<(), OrderError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(OrderError::InvalidStatusTransition {
                from: self.status,
                to: next,
            })
        }
    }
}
