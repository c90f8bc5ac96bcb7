use std::time::Duration;

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
};

use crate::domain::order::{IntegrationError, Publisher};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RedpandaPublisher {
    producer: FutureProducer,
    circuit_breaker: CircuitBreaker,
}

impl RedpandaPublisher {
    pub fn new(brokers: &str) -> anyhow::Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        // Configure circuit breaker for Redpanda
        let cb_config = CircuitBreakerConfig {
            failure_threshold: 5,           // Open after 5 failures
            cooldown: Duration::from_secs(30),
            success_threshold: 3,           // Need 3 successes to close
        };

        Ok(Self {
            producer,
            circuit_breaker: CircuitBreaker::new("redpanda", cb_config),
        })
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state().await
    }
}

#[async_trait]
impl Publisher for RedpandaPublisher {
    async fn publish(&self, destination: &str, key: &str, payload: &str) -> Result<(), IntegrationError> {
        // Use circuit breaker to protect against Redpanda failures
        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(destination).key(key).payload(payload);

                self.producer
                    .send(record, rdkafka::util::Timeout::After(SEND_TIMEOUT))
                    .await
                    .map_err(|(e, _)| e)
            })
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(topic = %destination, key = %key, "Published to Redpanda");
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(topic = %destination, "Circuit breaker open - Redpanda unavailable");
                Err(IntegrationError::CircuitOpen(self.circuit_breaker.name().to_string()))
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::error!(error = %e, topic = %destination, "Failed to publish to Redpanda");
                Err(IntegrationError::Unavailable(e.to_string()))
            }
        }
    }
}
