use std::sync::Arc;

use async_trait::async_trait;

use super::aggregate::Order;
use super::errors::{IntegrationError, ServiceError};
use super::events::OrderEvent;
use super::ports::{CheckoutHandoff, Payment, PaymentGateway, Publisher};

// ============================================================================
// Checkout Hand-offs
// ============================================================================
//
// queue   - publish a payment-pending event for the payment service
// payment - create the payment record synchronously over HTTP
//
// ============================================================================

pub struct QueueHandoff {
    publisher: Arc<dyn Publisher>,
    destination: String,
}

impl QueueHandoff {
    pub fn new(publisher: Arc<dyn Publisher>, destination: impl Into<String>) -> Self {
        Self {
            publisher,
            destination: destination.into(),
        }
    }
}

#[async_trait]
impl CheckoutHandoff for QueueHandoff {
    fn name(&self) -> &'static str {
        "queue"
    }

    async fn hand_off(&self, order: &Order) -> Result<(), ServiceError> {
        let event = OrderEvent::PaymentPending {
            order_id: order.id.clone(),
        };
        let payload = event
            .payload()
            .map_err(|e| ServiceError::Publish(IntegrationError::InvalidResponse(e.to_string())))?;

        self.publisher
            .publish(&self.destination, &order.id, &payload)
            .await
            .map_err(ServiceError::Publish)
    }

    fn timed_out(&self) -> ServiceError {
        ServiceError::Publish(IntegrationError::Timeout)
    }
}

pub struct PaymentHandoff {
    gateway: Arc<dyn PaymentGateway>,
    payment_type: i32,
}

impl PaymentHandoff {
    pub fn new(gateway: Arc<dyn PaymentGateway>, payment_type: i32) -> Self {
        Self { gateway, payment_type }
    }
}

#[async_trait]
impl CheckoutHandoff for PaymentHandoff {
    fn name(&self) -> &'static str {
        "payment"
    }

    async fn hand_off(&self, order: &Order) -> Result<(), ServiceError> {
        let payment = Payment {
            payment_type: self.payment_type,
            order_id: order.id.clone(),
        };

        // The order id doubles as idempotency key, so a redelivered checkout
        // cannot open a second payment.
        self.gateway
            .create_payment(&payment, &order.id)
            .await
            .map_err(ServiceError::Payment)
    }

    fn timed_out(&self) -> ServiceError {
        ServiceError::Payment(IntegrationError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::value_objects::LineItems;
    use crate::testing::{RecordingPaymentGateway, RecordingPublisher};

    fn order(id: &str) -> Order {
        let mut order = Order::draft("customer-1", LineItems::new());
        order.id = id.to_string();
        order
    }

    #[tokio::test]
    async fn test_queue_handoff_publishes_order_id() {
        let publisher = Arc::new(RecordingPublisher::default());
        let handoff = QueueHandoff::new(publisher.clone(), "payment-pending");

        handoff.hand_off(&order("o-1")).await.unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].destination, "payment-pending");
        assert_eq!(published[0].key, "o-1");
        assert_eq!(published[0].payload, "\"o-1\"");
    }

    #[tokio::test]
    async fn test_queue_handoff_failure_is_publish_error() {
        let publisher = Arc::new(RecordingPublisher::failing());
        let handoff = QueueHandoff::new(publisher, "payment-pending");

        let result = handoff.hand_off(&order("o-1")).await;
        assert!(matches!(result, Err(ServiceError::Publish(_))));
    }

    #[tokio::test]
    async fn test_payment_handoff_uses_order_id_as_idempotency_key() {
        let gateway = Arc::new(RecordingPaymentGateway::default());
        let handoff = PaymentHandoff::new(gateway.clone(), 1);

        handoff.hand_off(&order("o-7")).await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Payment { payment_type: 1, order_id: "o-7".to_string() });
        assert_eq!(calls[0].1, "o-7");
    }

    #[tokio::test]
    async fn test_payment_handoff_failure_is_payment_error() {
        let gateway = Arc::new(RecordingPaymentGateway::failing());
        let handoff = PaymentHandoff::new(gateway, 1);

        let result = handoff.hand_off(&order("o-7")).await;
        assert!(matches!(result, Err(ServiceError::Payment(_))));
    }
}
