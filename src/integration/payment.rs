use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::domain::order::{IntegrationError, Payment, PaymentGateway};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Payment record creation against the payment service:
/// `POST {base}/api/payment/`
pub struct HttpPaymentGateway {
    client: Client,
    endpoint: String,
    circuit_breaker: CircuitBreaker,
}

impl HttpPaymentGateway {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/payment/", base_url.trim_end_matches('/')),
            circuit_breaker: CircuitBreaker::new("payment", CircuitBreakerConfig::default()),
        })
    }

    async fn post(&self, payment: &Payment, idempotency_key: &str) -> Result<(), IntegrationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(payment)
            .send()
            .await
            .map_err(|e| IntegrationError::Unavailable(e.to_string()))?;

        check_status(response.status())
    }
}

/// Only 200 counts as an accepted payment.
fn check_status(status: StatusCode) -> Result<(), IntegrationError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(IntegrationError::Rejected {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment(&self, payment: &Payment, idempotency_key: &str) -> Result<(), IntegrationError> {
        match self.circuit_breaker.call(self.post(payment, idempotency_key)).await {
            Ok(()) => {
                tracing::info!(order_id = %payment.order_id, "💳 Payment created");
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::warn!(order_id = %payment.order_id, "Circuit breaker open - payment service unavailable");
                Err(IntegrationError::CircuitOpen(self.circuit_breaker.name().to_string()))
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::warn!(order_id = %payment.order_id, error = %e, "Payment creation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_200_is_accepted() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::CREATED),
            Err(IntegrationError::Rejected { status: 201 })
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY),
            Err(IntegrationError::Rejected { status: 502 })
        ));
    }

    #[test]
    fn test_endpoint_has_single_slash() {
        let gateway = HttpPaymentGateway::new("http://payments:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.endpoint, "http://payments:8080/api/payment/");
    }

    #[test]
    fn test_payment_body_shape() {
        let body = serde_json::to_value(Payment {
            payment_type: 1,
            order_id: "o-1".to_string(),
        })
        .unwrap();

        assert_eq!(body, serde_json::json!({ "payment_type": 1, "order_id": "o-1" }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let gateway = HttpPaymentGateway::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let payment = Payment {
            payment_type: 0,
            order_id: "o-1".to_string(),
        };

        let result = gateway.create_payment(&payment, "o-1").await;
        assert!(matches!(result, Err(IntegrationError::Unavailable(_))));
    }
}
