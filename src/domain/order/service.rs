use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::metrics::Metrics;

use super::aggregate::Order;
use super::errors::{IntegrationError, RepositoryError, ServiceError};
use super::events::OrderEvent;
use super::ports::{CheckoutHandoff, OrderRepository, ProductCatalog, Publisher};
use super::value_objects::OrderStatus;

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: Request → Catalog → Repository → Broker / Payment
//
// Nothing is retried here. Each collaborator call is bounded by
// `call_timeout`; a timeout is reported as that collaborator's error.
//
// ============================================================================

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductCatalog>,
    publisher: Arc<dyn Publisher>,
    handoff: Arc<dyn CheckoutHandoff>,
    order_created_destination: String,
    call_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        catalog: Arc<dyn ProductCatalog>,
        publisher: Arc<dyn Publisher>,
        handoff: Arc<dyn CheckoutHandoff>,
        order_created_destination: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            catalog,
            publisher,
            handoff,
            order_created_destination: order_created_destination.into(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            metrics: None,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Create a new order: fresh id, RECEIVED, catalog-enriched items and a
    /// computed total. Publishes the order-created event once persisted.
    pub async fn create(&self, mut order: Order) -> Result<Order, ServiceError> {
        let now = Utc::now();
        order.id = Uuid::new_v4().to_string();
        order.status = OrderStatus::Received;
        order.created_at = now;
        order.updated_at = now;

        tracing::info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            item_count = order.items.len(),
            "Creating new order"
        );

        self.bounded(
            "catalog",
            self.catalog.get_products(&mut order.items),
            IntegrationError::Timeout,
        )
        .await
        .map_err(|e| {
            tracing::warn!(order_id = %order.id, error = %e, "Catalog enrichment failed");
            ServiceError::Catalog(e)
        })?;

        order.recompute_total()?;

        let created = self
            .bounded("repository", self.repo.create(&order), RepositoryError::Timeout)
            .await?;

        let event = OrderEvent::Created {
            order_id: created.id.clone(),
        };
        let payload = event
            .payload()
            .map_err(|e| ServiceError::Publish(IntegrationError::InvalidResponse(e.to_string())))?;

        if let Err(e) = self
            .bounded(
                "publisher",
                self.publisher
                    .publish(&self.order_created_destination, &created.id, &payload),
                IntegrationError::Timeout,
            )
            .await
        {
            // The order is already stored; the caller sees a failed create.
            tracing::error!(
                order_id = %created.id,
                event_type = event.event_type(),
                error = %e,
                "Order persisted but creation event was not published"
            );
            return Err(ServiceError::Publish(e));
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_order_created();
        }

        tracing::info!(order_id = %created.id, total = %created.total, "✅ Order created");

        Ok(created)
    }

    /// Replace customer and items of an existing order. Identity, status and
    /// creation time are kept from the stored order.
    pub async fn update(&self, id: &str, order: Order) -> Result<Order, ServiceError> {
        let existing = self.load(id).await?;

        let mut replacement = Order {
            id: existing.id,
            customer_id: order.customer_id,
            status: existing.status,
            items: order.items,
            total: Decimal::ZERO,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        replacement.recompute_total()?;

        self.bounded("repository", self.repo.update(id, &replacement), RepositoryError::Timeout)
            .await?;

        tracing::info!(
            order_id = %id,
            item_count = replacement.items.len(),
            total = %replacement.total,
            "Order updated"
        );

        Ok(replacement)
    }

    pub async fn get_all(&self) -> Result<Vec<Order>, ServiceError> {
        Ok(self
            .bounded("repository", self.repo.get_all(), RepositoryError::Timeout)
            .await?)
    }

    /// `Ok(None)` when the order does not exist.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Order>, ServiceError> {
        Ok(self
            .bounded("repository", self.repo.get_by_id(id), RepositoryError::Timeout)
            .await?)
    }

    pub async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, ServiceError> {
        Ok(self
            .bounded("repository", self.repo.get_by_status(status), RepositoryError::Timeout)
            .await?)
    }

    /// Move an existing order to `status` through the dedicated status path.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> Result<(), ServiceError> {
        let order = self.load(id).await?;
        order.ensure_transition(status)?;

        self.bounded(
            "repository",
            self.repo.update_status(id, status, Utc::now()),
            RepositoryError::Timeout,
        )
        .await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_status_change(status.name());
        }

        tracing::info!(
            order_id = %id,
            from = %order.status,
            to = %status,
            "Order status updated"
        );

        Ok(())
    }

    /// Hand the order off to payment processing, then mark it
    /// PAYMENT_PENDING. The status is written only after the hand-off
    /// succeeded.
    pub async fn checkout_order(&self, id: &str) -> Result<Order, ServiceError> {
        let result = self.checkout(id).await;

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "success",
                Err(e) if e.is_transient() => "transient_failure",
                Err(_) => "rejected",
            };
            metrics.record_checkout(outcome);
        }

        result
    }

    async fn checkout(&self, id: &str) -> Result<Order, ServiceError> {
        let mut order = self.load(id).await?;
        order.ensure_transition(OrderStatus::PaymentPending)?;

        tracing::info!(
            order_id = %id,
            handoff = self.handoff.name(),
            "Checking out order"
        );

        self.bounded("handoff", self.handoff.hand_off(&order), self.handoff.timed_out())
            .await
            .map_err(|e| {
                tracing::warn!(order_id = %id, error = %e, "Checkout hand-off failed, status unchanged");
                e
            })?;

        let now = Utc::now();
        if let Err(e) = self
            .bounded(
                "repository",
                self.repo.update_status(id, OrderStatus::PaymentPending, now),
                RepositoryError::Timeout,
            )
            .await
        {
            // Payment was initiated but the order still reads RECEIVED.
            tracing::error!(
                order_id = %id,
                handoff = self.handoff.name(),
                error = %e,
                "Hand-off succeeded but status write failed; order needs reconciliation"
            );
            return Err(e.into());
        }

        order.status = OrderStatus::PaymentPending;
        order.updated_at = now;

        if let Some(metrics) = &self.metrics {
            metrics.record_status_change(order.status.name());
        }

        tracing::info!(order_id = %id, "✅ Order checked out");

        Ok(order)
    }

    async fn load(&self, id: &str) -> Result<Order, ServiceError> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    async fn bounded<T, E, F>(&self, call: &'static str, fut: F, on_timeout: E) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();

        let result = match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    call = call,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Collaborator call timed out"
                );
                Err(on_timeout)
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.observe_call(call, started.elapsed().as_secs_f64(), result.is_ok());
        }

        result
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
