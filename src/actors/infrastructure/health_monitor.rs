use actix::prelude::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::actors::core::{ComponentHealth, HealthStatus};
use crate::messaging::RedpandaPublisher;
use crate::metrics::Metrics;

// ============================================================================
// Health Monitor Actor - Aggregates component health
// ============================================================================
//
// Components (queue listeners, consumers that failed to start) push their
// status with UpdateHealth. The Redpanda publisher is polled: its circuit
// breaker state becomes the "redpanda" component and the breaker gauge.
//
// ============================================================================

const PUBLISHER_CHECK_INTERVAL: Duration = Duration::from_secs(10);

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct UpdateHealth {
    pub component: String,
    pub status: HealthStatus,
    pub details: Option<String>,
}

#[derive(Message)]
#[rtype(result = "SystemHealth")]
pub struct GetSystemHealth;

#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub check_time: DateTime<Utc>,
}

// ============================================================================
// Health Monitor Actor
// ============================================================================

#[derive(Default)]
pub struct HealthMonitorActor {
    components: HashMap<String, ComponentHealth>,
    publisher: Option<Arc<RedpandaPublisher>>,
    metrics: Option<Arc<Metrics>>,
}

impl HealthMonitorActor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_publisher(mut self, publisher: Arc<RedpandaPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Worst status wins; unhealthy components are named.
fn overall_status(components: &HashMap<String, ComponentHealth>) -> HealthStatus {
    let mut has_degraded = false;
    let mut unhealthy_components = Vec::new();

    for (name, health) in components {
        match &health.status {
            HealthStatus::Unhealthy(msg) => {
                unhealthy_components.push(format!("{}: {}", name, msg));
            }
            HealthStatus::Degraded(_) => {
                has_degraded = true;
            }
            HealthStatus::Healthy => {}
        }
    }

    if !unhealthy_components.is_empty() {
        unhealthy_components.sort();
        HealthStatus::Unhealthy(unhealthy_components.join(", "))
    } else if has_degraded {
        HealthStatus::Degraded("Some components degraded".to_string())
    } else {
        HealthStatus::Healthy
    }
}

impl Actor for HealthMonitorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("HealthMonitorActor started");

        let addr = ctx.address();

        ctx.run_interval(PUBLISHER_CHECK_INTERVAL, move |act, _ctx| {
            let publisher = act.publisher.clone();
            let metrics = act.metrics.clone();
            let addr = addr.clone();

            actix::spawn(async move {
                if let Some(publisher) = publisher {
                    let state = publisher.circuit_state().await;

                    if let Some(metrics) = metrics {
                        metrics.update_circuit_breaker_state(state.code());
                    }

                    addr.do_send(UpdateHealth {
                        component: "redpanda".to_string(),
                        status: HealthStatus::from_circuit(state),
                        details: None,
                    });
                }
            });
        });
    }
}

impl Handler<UpdateHealth> for HealthMonitorActor {
    type Result = ();

    fn handle(&mut self, msg: UpdateHealth, _: &mut Self::Context) {
        tracing::debug!(
            component = %msg.component,
            status = ?msg.status,
            "Updated component health"
        );

        let health = ComponentHealth {
            name: msg.component.clone(),
            status: msg.status,
            last_check: Utc::now(),
            details: msg.details,
        };

        self.components.insert(msg.component, health);
    }
}

impl Handler<GetSystemHealth> for HealthMonitorActor {
    type Result = MessageResult<GetSystemHealth>;

    fn handle(&mut self, _msg: GetSystemHealth, _: &mut Self::Context) -> Self::Result {
        MessageResult(SystemHealth {
            overall_status: overall_status(&self.components),
            components: self.components.clone(),
            check_time: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(component: &str, status: HealthStatus) -> UpdateHealth {
        UpdateHealth {
            component: component.to_string(),
            status,
            details: None,
        }
    }

    #[actix::test]
    async fn test_no_components_is_healthy() {
        let monitor = HealthMonitorActor::new().start();

        let health = monitor.send(GetSystemHealth).await.unwrap();

        assert_eq!(health.overall_status, HealthStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[actix::test]
    async fn test_degraded_component_degrades_system() {
        let monitor = HealthMonitorActor::new().start();
        monitor.send(update("listener:order_created", HealthStatus::Healthy)).await.unwrap();
        monitor
            .send(update("redpanda", HealthStatus::Degraded("half-open".to_string())))
            .await
            .unwrap();

        let health = monitor.send(GetSystemHealth).await.unwrap();

        assert!(matches!(health.overall_status, HealthStatus::Degraded(_)));
        assert_eq!(health.components.len(), 2);
    }

    #[actix::test]
    async fn test_unhealthy_component_is_named() {
        let monitor = HealthMonitorActor::new().start();
        monitor
            .send(update("redpanda", HealthStatus::Degraded("half-open".to_string())))
            .await
            .unwrap();
        monitor
            .send(update("listener:payment_payed", HealthStatus::Unhealthy("no consumer".to_string())))
            .await
            .unwrap();

        let health = monitor.send(GetSystemHealth).await.unwrap();

        assert_eq!(
            health.overall_status,
            HealthStatus::Unhealthy("listener:payment_payed: no consumer".to_string())
        );
    }

    #[actix::test]
    async fn test_latest_update_wins() {
        let monitor = HealthMonitorActor::new().start();
        monitor
            .send(update("redpanda", HealthStatus::Unhealthy("open".to_string())))
            .await
            .unwrap();
        monitor.send(update("redpanda", HealthStatus::Healthy)).await.unwrap();

        let health = monitor.send(GetSystemHealth).await.unwrap();
        assert!(health.overall_status.is_healthy());
    }
}
