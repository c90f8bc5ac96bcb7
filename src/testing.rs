// In-crate fakes for the order service ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::order::{
    CheckoutHandoff, IntegrationError, LineItems, Order, OrderRepository, OrderStatus, Payment,
    PaymentGateway, Product, ProductCatalog, Publisher, RepositoryError, ServiceError,
};
use crate::store::InMemoryOrderRepository;

pub fn product(id: &str, price: &str, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: format!("{} name", id),
        price: price.parse().expect("test price"),
        category: category.to_string(),
    }
}

// ============================================================================
// Repository
// ============================================================================

/// In-memory repository with switchable failures and write counters.
pub struct FlakyRepository {
    inner: InMemoryOrderRepository,
    fail_reads: AtomicBool,
    fail_status_writes: AtomicBool,
    writes: AtomicUsize,
    status_writes: AtomicUsize,
}

impl FlakyRepository {
    pub fn new(inner: InMemoryOrderRepository) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_status_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
            status_writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_status_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful create/update calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Successful update_status calls.
    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage(anyhow::anyhow!("connection reset")));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for FlakyRepository {
    async fn get_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.check_reads()?;
        self.inner.get_all().await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        self.check_reads()?;
        self.inner.get_by_id(id).await
    }

    async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepositoryError> {
        self.check_reads()?;
        self.inner.get_by_status(status).await
    }

    async fn create(&self, order: &Order) -> Result<Order, RepositoryError> {
        let created = self.inner.create(order).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(created)
    }

    async fn update(&self, id: &str, order: &Order) -> Result<(), RepositoryError> {
        self.inner.update(id, order).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if self.fail_status_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage(anyhow::anyhow!("write timeout")));
        }
        self.inner.update_status(id, status, updated_at).await?;
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Default)]
pub struct StaticCatalog {
    products: HashMap<String, Product>,
    fail: bool,
    delay: Option<Duration>,
}

impl StaticCatalog {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ProductCatalog for StaticCatalog {
    async fn get_products(&self, items: &mut LineItems) -> Result<(), IntegrationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(IntegrationError::Unavailable("catalog down".to_string()));
        }

        for (id, item) in items.iter_mut() {
            let product = self
                .products
                .get(id)
                .ok_or_else(|| IntegrationError::ProductNotFound(id.clone()))?;
            item.product = product.clone();
        }
        Ok(())
    }
}

// ============================================================================
// Publisher
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub destination: String,
    pub key: String,
    pub payload: String,
}

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Published>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, destination: &str, key: &str, payload: &str) -> Result<(), IntegrationError> {
        if self.fail {
            return Err(IntegrationError::Unavailable("broker down".to_string()));
        }
        self.published.lock().unwrap().push(Published {
            destination: destination.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// Payment
// ============================================================================

#[derive(Default)]
pub struct RecordingPaymentGateway {
    calls: Mutex<Vec<(Payment, String)>>,
    fail: bool,
}

impl RecordingPaymentGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(Payment, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingPaymentGateway {
    async fn create_payment(&self, payment: &Payment, idempotency_key: &str) -> Result<(), IntegrationError> {
        if self.fail {
            return Err(IntegrationError::Rejected { status: 502 });
        }
        self.calls
            .lock()
            .unwrap()
            .push((payment.clone(), idempotency_key.to_string()));
        Ok(())
    }
}

/// Hand-off that records the order ids it was asked to hand off.
#[derive(Default)]
pub struct RecordingHandoff {
    calls: Mutex<Vec<String>>,
    rejection: Option<u16>,
}

impl RecordingHandoff {
    pub fn failing() -> Self {
        Self::rejecting(500)
    }

    /// Every hand-off is rejected with the given HTTP status.
    pub fn rejecting(status: u16) -> Self {
        Self {
            rejection: Some(status),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutHandoff for RecordingHandoff {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn hand_off(&self, order: &Order) -> Result<(), ServiceError> {
        if let Some(status) = self.rejection {
            return Err(ServiceError::Payment(IntegrationError::Rejected { status }));
        }
        self.calls.lock().unwrap().push(order.id.clone());
        Ok(())
    }

    fn timed_out(&self) -> ServiceError {
        ServiceError::Payment(IntegrationError::Timeout)
    }
}
