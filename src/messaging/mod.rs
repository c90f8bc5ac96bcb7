// ============================================================================
// Messaging - Redpanda producer and inbound queue listeners
// ============================================================================

pub mod consumer;
pub mod dispatch;
pub mod redpanda;

pub use consumer::QueueConsumer;
pub use dispatch::{MessageDispatcher, Outcome, QueueKind};
pub use redpanda::RedpandaPublisher;
