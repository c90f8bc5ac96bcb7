use serde::{Deserialize, Serialize};

// ============================================================================
// Order Events - Messages published to the broker
// ============================================================================

/// Events the service emits. Each travels as a bare JSON string holding the
/// order id, keyed by the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderEvent {
    /// Order persisted and waiting for checkout
    Created { order_id: String },
    /// Order handed off to payment processing
    PaymentPending { order_id: String },
}

impl OrderEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created { .. } => "OrderCreated",
            OrderEvent::PaymentPending { .. } => "OrderPaymentPending",
        }
    }

    pub fn order_id(&self) -> &str {
        match self {
            OrderEvent::Created { order_id } | OrderEvent::PaymentPending { order_id } => order_id,
        }
    }

    pub fn payload(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self.order_id())?)
    }
}

/// Decode a message payload carrying a bare order id.
pub fn decode_order_id(payload: &[u8]) -> anyhow::Result<String> {
    let order_id: String = serde_json::from_slice(payload)?;
    if order_id.trim().is_empty() {
        anyhow::bail!("empty order id in payload");
    }
    Ok(order_id)
}
