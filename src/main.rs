use actix::prelude::*;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_service::actors::{CoordinatorActor, GetHealthMonitor, GetSystemHealth, ListenerSettings, Shutdown};
use order_service::config::{AppConfig, CheckoutMode, StorageKind};
use order_service::domain::order::{
    CheckoutHandoff, ItemRequest, OrderRepository, OrderService, PaymentHandoff, PlaceOrder, QueueHandoff,
};
use order_service::integration::{HttpPaymentGateway, HttpProductCatalog};
use order_service::messaging::{MessageDispatcher, QueueKind, RedpandaPublisher};
use order_service::metrics;
use order_service::store::{InMemoryOrderRepository, ScyllaOrderRepository};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_service=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order service");

    let config = AppConfig::from_env()?;

    // === 1. Initialize Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // Start metrics HTTP server in background thread
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to start metrics runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 2. Order store ===
    let repo = build_repository(&config).await?;

    // === 3. Collaborators ===
    let publisher = Arc::new(RedpandaPublisher::new(&config.kafka_brokers)?);
    let catalog = Arc::new(HttpProductCatalog::new(
        &config.product_catalog_url,
        config.call_timeout,
    )?);

    let handoff: Arc<dyn CheckoutHandoff> = match config.checkout_mode {
        CheckoutMode::Queue => Arc::new(QueueHandoff::new(
            publisher.clone(),
            config.queues.payment_pending.clone(),
        )),
        CheckoutMode::Payment => Arc::new(PaymentHandoff::new(
            Arc::new(HttpPaymentGateway::new(
                &config.payment_service_url,
                config.call_timeout,
            )?),
            config.payment_type,
        )),
    };
    tracing::info!(handoff = handoff.name(), "Checkout hand-off selected");

    let service = Arc::new(
        OrderService::new(
            repo,
            catalog,
            publisher.clone(),
            handoff,
            config.queues.order_created.clone(),
        )
        .with_call_timeout(config.call_timeout)
        .with_metrics(metrics.clone()),
    );

    // === 4. Start Coordinator Actor (queue listeners + health) ===
    let dispatcher = MessageDispatcher::new(service.clone()).with_metrics(metrics.clone());
    let settings = ListenerSettings {
        brokers: config.kafka_brokers.clone(),
        group_id: config.kafka_group_id.clone(),
        topics: QueueKind::ALL
            .iter()
            .map(|kind| (*kind, config.queues.inbound(*kind).to_string()))
            .collect(),
        retry_backoff: config.queue_retry_backoff,
    };
    let coordinator = CoordinatorActor::new(dispatcher, settings, publisher, metrics.clone()).start();

    // === 5. Optional demo order ===
    if config.seed_demo_order {
        seed_demo_order(&service).await;
    }

    tracing::info!("✅ Order service running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    if let Some(health_monitor) = coordinator.send(GetHealthMonitor).await? {
        let health = health_monitor.send(GetSystemHealth).await?;
        tracing::info!(status = ?health.overall_status, "Final system health");
    }

    coordinator.send(Shutdown).await?;
    tracing::info!("👋 Order service stopped");

    Ok(())
}

async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn OrderRepository>> {
    match config.storage {
        StorageKind::Memory => {
            tracing::warn!("Using in-memory order store, orders are lost on restart");
            Ok(Arc::new(InMemoryOrderRepository::new()))
        }
        StorageKind::Scylla => {
            tracing::info!(node = %config.scylla_node, "Connecting to ScyllaDB...");
            let session: Session = SessionBuilder::new()
                .known_node(&config.scylla_node)
                .build()
                .await?;

            session
                .query_unpaged(
                    format!(
                        "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                         {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                        config.scylla_keyspace
                    ),
                    &[],
                )
                .await?;

            session.use_keyspace(&config.scylla_keyspace, false).await?;

            let repo = ScyllaOrderRepository::new(Arc::new(session));
            repo.ensure_schema().await?;
            Ok(Arc::new(repo))
        }
    }
}

/// Place one order through the normal create path.
async fn seed_demo_order(service: &OrderService) {
    tracing::info!("📝 Placing demo order");

    let request = PlaceOrder {
        customer_id: "demo-customer".to_string(),
        items: vec![
            ItemRequest {
                product_id: "burger".to_string(),
                quantity: 2,
            },
            ItemRequest {
                product_id: "fries".to_string(),
                quantity: 1,
            },
        ],
        status: None,
    };

    let order = match request.into_order() {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(error = %e, "Demo order request invalid");
            return;
        }
    };

    match service.create(order).await {
        Ok(order) => tracing::info!(order_id = %order.id, total = %order.total, "✅ Demo order created"),
        Err(e) => tracing::warn!(error = %e, "Demo order not created"),
    }
}
