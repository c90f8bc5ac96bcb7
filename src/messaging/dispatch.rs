use std::sync::Arc;

use crate::domain::order::{decode_order_id, OrderService, OrderStatus, ServiceError};
use crate::metrics::Metrics;

// ============================================================================
// Message Dispatch - Inbound topic → service operation
// ============================================================================
//
//   order-created     → checkout_order
//   payment-payed     → update_status(PAYED)
//   payment-cancelled → update_status(CANCELLED)
//
// The outcome tells the listener whether to commit the offset or redeliver.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    OrderCreated,
    PaymentPayed,
    PaymentCancelled,
}

impl QueueKind {
    pub const ALL: [QueueKind; 3] = [
        QueueKind::OrderCreated,
        QueueKind::PaymentPayed,
        QueueKind::PaymentCancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QueueKind::OrderCreated => "order_created",
            QueueKind::PaymentPayed => "payment_payed",
            QueueKind::PaymentCancelled => "payment_cancelled",
        }
    }
}

/// What the listener should do with the message offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handled; commit.
    Processed,
    /// Will never succeed (bad payload, unknown order, invalid transition); commit.
    Rejected,
    /// May succeed later; leave uncommitted and redeliver.
    Retry,
}

impl Outcome {
    pub fn commits(self) -> bool {
        !matches!(self, Outcome::Retry)
    }

    fn label(self) -> &'static str {
        match self {
            Outcome::Processed => "processed",
            Outcome::Rejected => "rejected",
            Outcome::Retry => "retry",
        }
    }
}

#[derive(Clone)]
pub struct MessageDispatcher {
    service: Arc<OrderService>,
    metrics: Option<Arc<Metrics>>,
}

impl MessageDispatcher {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn dispatch(&self, kind: QueueKind, payload: &[u8]) -> Outcome {
        let outcome = match decode_order_id(payload) {
            Ok(order_id) => self.handle(kind, &order_id).await,
            Err(e) => {
                tracing::warn!(
                    queue = kind.label(),
                    error = %e,
                    "Malformed message payload, dropping"
                );
                Outcome::Rejected
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_queue_message(kind.label(), outcome.label());
        }

        outcome
    }

    async fn handle(&self, kind: QueueKind, order_id: &str) -> Outcome {
        let result = match kind {
            QueueKind::OrderCreated => self.service.checkout_order(order_id).await.map(|_| ()),
            QueueKind::PaymentPayed => self.service.update_status(order_id, OrderStatus::Payed).await,
            QueueKind::PaymentCancelled => {
                self.service
                    .update_status(order_id, OrderStatus::Cancelled)
                    .await
            }
        };

        match result {
            Ok(()) => {
                tracing::debug!(queue = kind.label(), order_id = %order_id, "Message processed");
                Outcome::Processed
            }
            Err(e) => classify(kind, order_id, &e),
        }
    }
}

fn classify(kind: QueueKind, order_id: &str, err: &ServiceError) -> Outcome {
    if err.is_transient() {
        tracing::warn!(
            queue = kind.label(),
            order_id = %order_id,
            error = %err,
            "Transient failure, message will be redelivered"
        );
        Outcome::Retry
    } else {
        tracing::error!(
            queue = kind.label(),
            order_id = %order_id,
            error = %err,
            kind = ?err.kind(),
            "Message cannot be processed, dropping"
        );
        Outcome::Rejected
    }
}
