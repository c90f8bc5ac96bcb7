use actix::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::actors::core::HealthStatus;
use crate::messaging::{MessageDispatcher, QueueConsumer, QueueKind, RedpandaPublisher};
use crate::metrics::Metrics;

use super::health_monitor::{GetSystemHealth, HealthMonitorActor, UpdateHealth};
use super::queue_listener::QueueListener;

// ============================================================================
// Coordinator Actor - Orchestrates all system actors
// ============================================================================
//
// Responsibilities:
// - Starts the health monitor and one queue listener per inbound topic
// - Reports system health periodically
// - Coordinates graceful shutdown
//
// Actor Hierarchy:
//   CoordinatorActor
//   ├── HealthMonitorActor
//   ├── QueueListener (order-created)
//   ├── QueueListener (payment-payed)
//   └── QueueListener (payment-cancelled)
//
// ============================================================================

const HEALTH_REPORT_INTERVAL: Duration = Duration::from_secs(30);

/// Where and how the listeners consume.
#[derive(Debug, Clone)]
pub struct ListenerSettings {
    pub brokers: String,
    pub group_id: String,
    /// Inbound topic per listener kind
    pub topics: Vec<(QueueKind, String)>,
    pub retry_backoff: Duration,
}

pub struct CoordinatorActor {
    dispatcher: MessageDispatcher,
    settings: ListenerSettings,
    publisher: Arc<RedpandaPublisher>,
    metrics: Arc<Metrics>,
    health_monitor: Option<Addr<HealthMonitorActor>>,
    listeners: Vec<Addr<QueueListener>>,
}

impl CoordinatorActor {
    pub fn new(
        dispatcher: MessageDispatcher,
        settings: ListenerSettings,
        publisher: Arc<RedpandaPublisher>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            dispatcher,
            settings,
            publisher,
            metrics,
            health_monitor: None,
            listeners: Vec::new(),
        }
    }

    fn start_child_actors(&mut self) {
        tracing::info!("Starting child actors");

        let health_monitor = HealthMonitorActor::new()
            .with_publisher(self.publisher.clone())
            .with_metrics(self.metrics.clone())
            .start();
        self.health_monitor = Some(health_monitor.clone());

        for (kind, topic) in &self.settings.topics {
            let consumer = QueueConsumer::new(
                &self.settings.brokers,
                &self.settings.group_id,
                topic,
                *kind,
                self.dispatcher.clone(),
            )
            .map(|consumer| consumer.with_retry_backoff(self.settings.retry_backoff));

            match consumer {
                Ok(consumer) => {
                    let listener = QueueListener::new(*kind, consumer, health_monitor.clone()).start();
                    self.listeners.push(listener);
                }
                Err(e) => {
                    tracing::error!(topic = %topic, error = %e, "❌ Failed to create queue consumer");
                    health_monitor.do_send(UpdateHealth {
                        component: QueueListener::component_name(*kind),
                        status: HealthStatus::Unhealthy(format!("Consumer not created: {}", e)),
                        details: None,
                    });
                }
            }
        }

        tracing::info!(listeners = self.listeners.len(), "✅ Child actors started");
    }
}

impl Actor for CoordinatorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("🎯 CoordinatorActor started");
        self.start_child_actors();

        // Schedule periodic health reports
        ctx.run_interval(HEALTH_REPORT_INTERVAL, |act, _ctx| {
            if let Some(ref health_monitor) = act.health_monitor {
                let health_monitor = health_monitor.clone();
                actix::spawn(async move {
                    match health_monitor.send(GetSystemHealth).await {
                        Ok(health) => match health.overall_status {
                            HealthStatus::Healthy => {
                                tracing::debug!("System health check: Healthy");
                            }
                            HealthStatus::Degraded(ref msg) => {
                                tracing::warn!("System health check: Degraded - {}", msg);
                            }
                            HealthStatus::Unhealthy(ref msg) => {
                                tracing::error!("System health check: Unhealthy - {}", msg);
                            }
                        },
                        Err(e) => {
                            tracing::error!("Failed to get system health: {}", e);
                        }
                    }
                });
            }
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!("🛑 CoordinatorActor stopped");
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

impl Handler<Shutdown> for CoordinatorActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        tracing::info!("Received shutdown signal");

        for listener in self.listeners.drain(..) {
            listener.do_send(StopActor);
        }

        if let Some(health_monitor) = self.health_monitor.take() {
            health_monitor.do_send(StopActor);
        }

        ctx.stop();
    }
}

/// Message to gracefully stop an actor
#[derive(Message)]
#[rtype(result = "()")]
struct StopActor;

impl Handler<StopActor> for QueueListener {
    type Result = ();

    fn handle(&mut self, _: StopActor, ctx: &mut Self::Context) {
        ctx.stop();
    }
}

impl Handler<StopActor> for HealthMonitorActor {
    type Result = ();

    fn handle(&mut self, _: StopActor, ctx: &mut Self::Context) {
        tracing::info!("HealthMonitorActor received stop signal");
        ctx.stop();
    }
}

#[derive(Message)]
#[rtype(result = "Option<Addr<HealthMonitorActor>>")]
pub struct GetHealthMonitor;

impl Handler<GetHealthMonitor> for CoordinatorActor {
    type Result = Option<Addr<HealthMonitorActor>>;

    fn handle(&mut self, _: GetHealthMonitor, _: &mut Self::Context) -> Self::Result {
        self.health_monitor.clone()
    }
}
