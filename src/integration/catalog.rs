use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::order::{IntegrationError, LineItems, Product, ProductCatalog};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

/// Catalog wire format. Prices travel as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub category: String,
}

impl ProductDto {
    fn into_product(self) -> Result<Product, IntegrationError> {
        let price: Decimal = self.price.trim().parse().map_err(|_| {
            IntegrationError::InvalidResponse(format!("price {:?} for product {}", self.price, self.id))
        })?;

        Ok(Product {
            id: self.id,
            name: self.name,
            price,
            category: self.category,
        })
    }
}

/// Product lookup against the catalog service:
/// `GET {base}/api/products?ids=a,b`
pub struct HttpProductCatalog {
    client: Client,
    base_url: String,
    circuit_breaker: CircuitBreaker,
}

impl HttpProductCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            circuit_breaker: CircuitBreaker::new("catalog", CircuitBreakerConfig::default()),
        })
    }

    async fn fetch(&self, ids: &[&str]) -> Result<Vec<ProductDto>, IntegrationError> {
        let url = format!("{}/api/products", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", ids.join(","))])
            .send()
            .await
            .map_err(|e| IntegrationError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntegrationError::Rejected {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<ProductDto>>()
            .await
            .map_err(|e| IntegrationError::InvalidResponse(e.to_string()))
    }
}

/// Copy catalog data onto every line item. Every item must be present.
pub fn apply_products(items: &mut LineItems, products: Vec<ProductDto>) -> Result<(), IntegrationError> {
    let mut by_id: HashMap<String, ProductDto> =
        products.into_iter().map(|p| (p.id.clone(), p)).collect();

    for (id, item) in items.iter_mut() {
        let dto = by_id
            .remove(id)
            .ok_or_else(|| IntegrationError::ProductNotFound(id.clone()))?;
        item.product = dto.into_product()?;
    }

    Ok(())
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn get_products(&self, items: &mut LineItems) -> Result<(), IntegrationError> {
        if items.is_empty() {
            return Ok(());
        }

        let ids: Vec<&str> = items.keys().map(String::as_str).collect();

        let products = match self.circuit_breaker.call(self.fetch(&ids)).await {
            Ok(products) => products,
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::warn!("Circuit breaker open - catalog unavailable");
                return Err(IntegrationError::CircuitOpen(self.circuit_breaker.name().to_string()));
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::warn!(error = %e, "Catalog lookup failed");
                return Err(e);
            }
        };

        tracing::debug!(requested = ids.len(), returned = products.len(), "Resolved products");

        apply_products(items, products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{line_items, OrderItem};

    fn dto(id: &str, price: &str) -> ProductDto {
        ProductDto {
            id: id.to_string(),
            name: format!("{} name", id),
            price: price.to_string(),
            category: "meal".to_string(),
        }
    }

    fn items(ids: &[&str]) -> LineItems {
        line_items(ids.iter().map(|id| OrderItem::unresolved(*id, 1)))
    }

    #[test]
    fn test_apply_products_fills_items() {
        let mut items = items(&["p1", "p2"]);

        apply_products(&mut items, vec![dto("p2", "3.10"), dto("p1", "12.50")]).unwrap();

        assert_eq!(items["p1"].product.price, "12.50".parse::<Decimal>().unwrap());
        assert_eq!(items["p2"].product.name, "p2 name");
        assert_eq!(items["p2"].product.category, "meal");
    }

    #[test]
    fn test_missing_product_fails() {
        let mut items = items(&["p1", "p2"]);

        let result = apply_products(&mut items, vec![dto("p1", "1")]);

        assert!(matches!(result, Err(IntegrationError::ProductNotFound(ref id)) if id == "p2"));
    }

    #[test]
    fn test_unparseable_price_is_invalid_response() {
        let mut items = items(&["p1"]);

        let result = apply_products(&mut items, vec![dto("p1", "twelve")]);

        assert!(matches!(result, Err(IntegrationError::InvalidResponse(_))));
    }

    #[test]
    fn test_response_decoding() {
        let body = r#"[{"id":"p1","name":"Burger","price":"19.90","category":"meal"},
                       {"id":"p2","name":"Water","price":"2"}]"#;

        let products: Vec<ProductDto> = serde_json::from_str(body).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[1].category, "");
        let product = products[0].clone().into_product().unwrap();
        assert_eq!(product.price, "19.90".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_empty_items_skip_the_call() {
        // Nothing listens on this port; an empty lookup must not reach it.
        let catalog = HttpProductCatalog::new("http://127.0.0.1:9/", Duration::from_millis(50)).unwrap();
        let mut items = LineItems::new();

        assert!(catalog.get_products(&mut items).await.is_ok());
    }
}
