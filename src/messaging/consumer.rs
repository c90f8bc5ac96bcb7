use std::time::Duration;

use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    message::{Message, OwnedMessage},
    Offset, TopicPartitionList,
};

use super::dispatch::{MessageDispatcher, QueueKind};

// ============================================================================
// Queue Consumer - one long-lived listener per inbound topic
// ============================================================================
//
// Offsets are committed by hand, only once the dispatcher says so. A message
// that should be retried is left uncommitted and the partition is rewound to
// it after `retry_backoff`, so the next poll delivers it again.
//
// ============================================================================

const SEEK_TIMEOUT: Duration = Duration::from_secs(5);
const RECV_ERROR_PAUSE: Duration = Duration::from_secs(1);

pub struct QueueConsumer {
    consumer: StreamConsumer,
    topic: String,
    kind: QueueKind,
    dispatcher: MessageDispatcher,
    retry_backoff: Duration,
}

fn consumer_config(brokers: &str, group_id: &str) -> ClientConfig {
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", brokers)
        .set("group.id", group_id)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "earliest")
        .set("session.timeout.ms", "10000");
    config
}

impl QueueConsumer {
    pub fn new(
        brokers: &str,
        group_id: &str,
        topic: &str,
        kind: QueueKind,
        dispatcher: MessageDispatcher,
    ) -> anyhow::Result<Self> {
        let consumer: StreamConsumer = consumer_config(brokers, group_id).create()?;
        consumer.subscribe(&[topic])?;

        Ok(Self {
            consumer,
            topic: topic.to_string(),
            kind,
            dispatcher,
            retry_backoff: Duration::from_secs(2),
        })
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Poll forever. Returns only if the task is dropped.
    pub async fn run(self) {
        tracing::info!(topic = %self.topic, queue = self.kind.label(), "👂 Queue listener started");

        loop {
            let message = match self.consumer.recv().await {
                Ok(message) => message.detach(),
                Err(e) => {
                    tracing::error!(topic = %self.topic, error = %e, "Failed to receive message");
                    tokio::time::sleep(RECV_ERROR_PAUSE).await;
                    continue;
                }
            };

            self.process(message).await;
        }
    }

    async fn process(&self, message: OwnedMessage) {
        tracing::debug!(
            topic = %message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            "📬 Received message"
        );

        let payload = message.payload().unwrap_or_default();
        let outcome = self.dispatcher.dispatch(self.kind, payload).await;

        if outcome.commits() {
            if let Err(e) = self.commit(&message) {
                tracing::error!(topic = %self.topic, offset = message.offset(), error = %e, "Failed to commit offset");
            }
            return;
        }

        tokio::time::sleep(self.retry_backoff).await;

        if let Err(e) = self.consumer.seek(
            message.topic(),
            message.partition(),
            Offset::Offset(message.offset()),
            SEEK_TIMEOUT,
        ) {
            tracing::error!(
                topic = %self.topic,
                offset = message.offset(),
                error = %e,
                "Failed to rewind partition for redelivery"
            );
        }
    }

    fn commit(&self, message: &OwnedMessage) -> anyhow::Result<()> {
        let mut offsets = TopicPartitionList::new();
        offsets.add_partition_offset(
            message.topic(),
            message.partition(),
            Offset::Offset(message.offset() + 1),
        )?;
        self.consumer.commit(&offsets, CommitMode::Async)?;
        Ok(())
    }
}
