use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;

use crate::messaging::QueueKind;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read from the environment once at startup (a `.env` file is loaded first
// when present). Every value has a default; a value that is set but does not
// parse stops startup.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    /// Publish a payment-pending event
    Queue,
    /// Call the payment service synchronously
    Payment,
}

impl FromStr for CheckoutMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(CheckoutMode::Queue),
            "payment" => Ok(CheckoutMode::Payment),
            other => bail!("unknown checkout mode '{}', expected queue or payment", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Scylla,
    Memory,
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scylla" => Ok(StorageKind::Scylla),
            "memory" => Ok(StorageKind::Memory),
            other => bail!("unknown storage '{}', expected scylla or memory", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueNames {
    pub order_created: String,
    pub payment_pending: String,
    pub payment_payed: String,
    pub payment_cancelled: String,
}

impl QueueNames {
    /// Inbound topic for each listener kind.
    pub fn inbound(&self, kind: QueueKind) -> &str {
        match kind {
            QueueKind::OrderCreated => &self.order_created,
            QueueKind::PaymentPayed => &self.payment_payed,
            QueueKind::PaymentCancelled => &self.payment_cancelled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageKind,
    pub scylla_node: String,
    pub scylla_keyspace: String,

    pub kafka_brokers: String,
    pub kafka_group_id: String,
    pub queues: QueueNames,
    /// Pause before a failed message is redelivered.
    pub queue_retry_backoff: Duration,

    pub product_catalog_url: String,
    pub payment_service_url: String,
    pub payment_type: i32,
    pub checkout_mode: CheckoutMode,
    pub call_timeout: Duration,

    pub metrics_port: u16,
    pub seed_demo_order: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env file if present
        let config = Self::from_lookup(|key| env::var(key).ok())?;

        tracing::info!(
            storage = ?config.storage,
            checkout_mode = ?config.checkout_mode,
            brokers = %config.kafka_brokers,
            "Application configuration loaded"
        );
        Ok(config)
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let call_timeout_ms: u64 = parse(&lookup, "CALL_TIMEOUT_MS", 5_000)?;
        if call_timeout_ms == 0 {
            bail!("CALL_TIMEOUT_MS must be greater than zero");
        }

        Ok(Self {
            storage: parse(&lookup, "STORAGE", StorageKind::Scylla)?,
            scylla_node: get("SCYLLA_NODE", "127.0.0.1:9042"),
            scylla_keyspace: get("SCYLLA_KEYSPACE", "orders_ks"),

            kafka_brokers: get("KAFKA_BROKERS", "127.0.0.1:9092"),
            kafka_group_id: get("KAFKA_GROUP_ID", "order-service"),
            queues: QueueNames {
                order_created: get("ORDER_QUEUE", "order_queue"),
                payment_pending: get("PAYMENT_PENDING_QUEUE", "payment_pending_queue"),
                payment_payed: get("PAYMENT_PAYED_QUEUE", "payment_payed_queue"),
                payment_cancelled: get("PAYMENT_CANCELLED_QUEUE", "payment_cancelled_queue"),
            },
            queue_retry_backoff: Duration::from_millis(parse(&lookup, "QUEUE_RETRY_BACKOFF_MS", 2_000)?),

            product_catalog_url: get("PRODUCT_CATALOG_URL", "http://127.0.0.1:8081"),
            payment_service_url: get("PAYMENT_SERVICE_URL", "http://127.0.0.1:8082"),
            payment_type: parse(&lookup, "PAYMENT_TYPE", 0)?,
            checkout_mode: parse(&lookup, "CHECKOUT_MODE", CheckoutMode::Queue)?,
            call_timeout: Duration::from_millis(call_timeout_ms),

            metrics_port: parse(&lookup, "METRICS_PORT", 9090)?,
            seed_demo_order: parse(&lookup, "SEED_DEMO_ORDER", false)?,
        })
    }
}

fn parse<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {} value '{}'", key, raw)),
    }
}
