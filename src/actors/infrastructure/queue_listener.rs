use actix::prelude::*;

use crate::actors::core::HealthStatus;
use crate::messaging::{QueueConsumer, QueueKind};

use super::health_monitor::{HealthMonitorActor, UpdateHealth};

// ============================================================================
// Queue Listener Actor - owns one topic's consumer loop
// ============================================================================
//
// The consumer loop runs as a future on this actor's context, so stopping
// the actor cancels it. Offsets not yet committed are redelivered to the
// next member of the consumer group.
//
// ============================================================================

pub struct QueueListener {
    kind: QueueKind,
    topic: String,
    consumer: Option<QueueConsumer>,
    health_monitor: Addr<HealthMonitorActor>,
}

impl QueueListener {
    pub fn new(kind: QueueKind, consumer: QueueConsumer, health_monitor: Addr<HealthMonitorActor>) -> Self {
        Self {
            kind,
            topic: consumer.topic().to_string(),
            consumer: Some(consumer),
            health_monitor,
        }
    }

    pub fn component_name(kind: QueueKind) -> String {
        format!("listener:{}", kind.label())
    }
}

impl Actor for QueueListener {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let Some(consumer) = self.consumer.take() else {
            return;
        };

        tracing::info!(topic = %self.topic, queue = self.kind.label(), "QueueListener actor started");

        self.health_monitor.do_send(UpdateHealth {
            component: Self::component_name(self.kind),
            status: HealthStatus::Healthy,
            details: Some(format!("Listening on {}", self.topic)),
        });

        ctx.spawn(consumer.run().into_actor(self));
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!(topic = %self.topic, "🛑 QueueListener stopped");

        self.health_monitor.do_send(UpdateHealth {
            component: Self::component_name(self.kind),
            status: HealthStatus::Unhealthy("Listener stopped".to_string()),
            details: None,
        });
    }
}
