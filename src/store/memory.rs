use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::order::{Order, OrderRepository, OrderStatus, RepositoryError};

/// Process-local order store.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        orders
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(Self::sorted(orders.values().cloned().collect()))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(Self::sorted(
            orders
                .values()
                .filter(|order| order.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn create(&self, order: &Order) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(RepositoryError::Conflict(order.id.clone()));
        }

        orders.insert(order.id.clone(), order.clone());
        tracing::debug!(order_id = %order.id, "Stored order in memory");
        Ok(order.clone())
    }

    async fn update(&self, id: &str, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        // Status only changes through update_status.
        let status = stored.status;
        *stored = order.clone();
        stored.id = id.to_string();
        stored.status = status;
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        stored.status = status;
        stored.updated_at = updated_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::LineItems;

    fn order(id: &str) -> Order {
        let mut order = Order::draft("customer-1", LineItems::new());
        order.id = id.to_string();
        order
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("o-1")).await.unwrap();

        let found = repo.get_by_id("o-1").await.unwrap();
        assert_eq!(found.unwrap().id, "o-1");
        assert!(repo.get_by_id("o-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("o-1")).await.unwrap();

        let result = repo.create(&order("o-1")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_stored_status() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("o-1")).await.unwrap();
        repo.update_status("o-1", OrderStatus::PaymentPending, Utc::now())
            .await
            .unwrap();

        let mut replacement = order("o-1");
        replacement.customer_id = "customer-2".to_string();
        replacement.status = OrderStatus::Completed;
        repo.update("o-1", &replacement).await.unwrap();

        let stored = repo.get_by_id("o-1").await.unwrap().unwrap();
        assert_eq!(stored.customer_id, "customer-2");
        assert_eq!(stored.status, OrderStatus::PaymentPending);
    }

    #[tokio::test]
    async fn test_writes_to_missing_order_fail() {
        let repo = InMemoryOrderRepository::new();

        assert!(matches!(
            repo.update("nope", &order("nope")).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.update_status("nope", OrderStatus::Payed, Utc::now()).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_by_status() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("o-1")).await.unwrap();
        repo.create(&order("o-2")).await.unwrap();
        repo.update_status("o-2", OrderStatus::PaymentPending, Utc::now())
            .await
            .unwrap();

        let received = repo.get_by_status(OrderStatus::Received).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id, "o-1");
        assert!(repo.get_by_status(OrderStatus::Payed).await.unwrap().is_empty());
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }
}
