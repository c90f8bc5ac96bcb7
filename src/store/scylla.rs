use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scylla::client::session::Session;
use scylla::value::{CqlValue, Row};

use crate::domain::order::{Order, OrderRepository, OrderStatus, RepositoryError};

// ============================================================================
// ScyllaDB Order Store
// ============================================================================
//
// Table layout:
//   orders(id text PRIMARY KEY, customer_id text, status int,
//          document text, created_at timestamp, updated_at timestamp)
//
// `document` is the JSON order. `status` and `updated_at` columns are
// authoritative: status writes touch only those columns, and full-document
// updates never touch `status`. Inserts are lightweight transactions, so an
// existing id is reported as a conflict instead of being overwritten.
//
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, status, document, updated_at FROM orders";

type OrderRow = (String, i32, String, DateTime<Utc>);

pub struct ScyllaOrderRepository {
    session: Arc<Session>,
}

impl ScyllaOrderRepository {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Create the orders table and its status index if missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS orders (
                    id text PRIMARY KEY,
                    customer_id text,
                    status int,
                    document text,
                    created_at timestamp,
                    updated_at timestamp
                )",
                &[],
            )
            .await?;

        self.session
            .query_unpaged("CREATE INDEX IF NOT EXISTS orders_status_idx ON orders (status)", &[])
            .await?;

        tracing::info!("Orders table ready");
        Ok(())
    }

    async fn select(&self, query: String, values: impl scylla::serialize::row::SerializeRow) -> Result<Vec<Order>> {
        let result = self.session.query_unpaged(query, values).await?;

        let mut orders = Vec::new();

        let rows_result = match result.into_rows_result() {
            Ok(rows) => rows,
            Err(_) => return Ok(orders), // No rows
        };

        for row in rows_result.rows::<OrderRow>()? {
            orders.push(order_from_row(row?)?);
        }

        tracing::debug!(count = orders.len(), "Loaded orders from ScyllaDB");
        Ok(orders)
    }

    /// `false` when an order with the same id already exists.
    async fn insert(&self, order: &Order) -> Result<bool> {
        let document = serde_json::to_string(order)?;

        let result = self
            .session
            .query_unpaged(
                "INSERT INTO orders (id, customer_id, status, document, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?) IF NOT EXISTS",
                (
                    &order.id,
                    &order.customer_id,
                    order.status.code(),
                    document,
                    order.created_at,
                    order.updated_at,
                ),
            )
            .await?;

        let row = result.into_rows_result()?.maybe_first_row::<Row>()?;
        Ok(row.as_ref().is_some_and(lwt_applied))
    }

    async fn replace_document(&self, id: &str, order: &Order) -> Result<()> {
        let document = serde_json::to_string(order)?;

        self.session
            .query_unpaged(
                "UPDATE orders SET customer_id = ?, document = ?, updated_at = ? WHERE id = ?",
                (&order.customer_id, document, order.updated_at, id),
            )
            .await?;

        Ok(())
    }

    async fn write_status(&self, id: &str, status: OrderStatus, updated_at: DateTime<Utc>) -> Result<()> {
        self.session
            .query_unpaged(
                "UPDATE orders SET status = ?, updated_at = ? WHERE id = ?",
                (status.code(), updated_at, id),
            )
            .await?;

        Ok(())
    }
}

/// The first column of a conditional statement's result is `[applied]`.
fn lwt_applied(row: &Row) -> bool {
    matches!(row.columns.first(), Some(Some(CqlValue::Boolean(true))))
}

/// Rebuild an order from its stored document, taking status and update time
/// from their own columns.
fn order_from_row((id, status, document, updated_at): OrderRow) -> Result<Order> {
    let mut order: Order = serde_json::from_str(&document)?;
    order.id = id;
    order.status = OrderStatus::from_code(status)?;
    order.updated_at = updated_at;
    Ok(order)
}

#[async_trait]
impl OrderRepository for ScyllaOrderRepository {
    async fn get_all(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.select(SELECT_COLUMNS.to_string(), ()).await?)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        let orders = self
            .select(format!("{} WHERE id = ?", SELECT_COLUMNS), (id,))
            .await?;
        Ok(orders.into_iter().next())
    }

    async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .select(format!("{} WHERE status = ?", SELECT_COLUMNS), (status.code(),))
            .await?)
    }

    async fn create(&self, order: &Order) -> Result<Order, RepositoryError> {
        if !self.insert(order).await? {
            tracing::warn!(order_id = %order.id, "Order id already stored, not overwriting");
            return Err(RepositoryError::Conflict(order.id.clone()));
        }

        tracing::info!(order_id = %order.id, "Persisted order document");
        Ok(order.clone())
    }

    async fn update(&self, id: &str, order: &Order) -> Result<(), RepositoryError> {
        self.replace_document(id, order).await?;

        tracing::debug!(order_id = %id, "Replaced order document");
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.write_status(id, status, updated_at).await?;

        tracing::debug!(order_id = %id, status = %status, "Wrote order status");
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Statements against a live cluster are exercised by running the service
// with STORAGE=scylla; only row decoding is covered here.
//
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{line_items, OrderItem, Product};

    fn stored_order() -> Order {
        let mut order = Order::draft(
            "customer-1",
            line_items(vec![OrderItem {
                product: Product {
                    id: "p1".to_string(),
                    name: "Burger".to_string(),
                    price: "12.90".parse().unwrap(),
                    category: "meal".to_string(),
                },
                quantity: 2,
            }]),
        );
        order.id = "o-1".to_string();
        order.recompute_total().unwrap();
        order
    }

    #[test]
    fn test_row_columns_override_document() {
        let order = stored_order();
        let document = serde_json::to_string(&order).unwrap();
        let later = order.updated_at + chrono::Duration::seconds(30);

        let decoded = order_from_row((
            "o-1".to_string(),
            OrderStatus::Payed.code(),
            document,
            later,
        ))
        .unwrap();

        assert_eq!(decoded.status, OrderStatus::Payed);
        assert_eq!(decoded.updated_at, later);
        assert_eq!(decoded.total, order.total);
        assert_eq!(decoded.items, order.items);
    }

    #[test]
    fn test_unknown_status_code_fails_decoding() {
        let order = stored_order();
        let document = serde_json::to_string(&order).unwrap();

        let result = order_from_row(("o-1".to_string(), 42, document, order.updated_at));
        assert!(result.is_err());
    }

    #[test]
    fn test_corrupt_document_fails_decoding() {
        let result = order_from_row(("o-1".to_string(), 0, "{".to_string(), Utc::now()));
        assert!(result.is_err());
    }

    #[test]
    fn test_applied_insert() {
        let row = Row {
            columns: vec![Some(CqlValue::Boolean(true))],
        };
        assert!(lwt_applied(&row));
    }

    #[test]
    fn test_insert_over_existing_id_not_applied() {
        let row = Row {
            columns: vec![
                Some(CqlValue::Boolean(false)),
                Some(CqlValue::Text("o-1".to_string())),
                Some(CqlValue::Text("customer-1".to_string())),
            ],
        };
        assert!(!lwt_applied(&row));
        assert!(!lwt_applied(&Row { columns: vec![None] }));
        assert!(!lwt_applied(&Row::default()));
    }
}
