// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order creation and status transitions
// - Checkout outcomes
// - Queue message handling per queue and outcome
// - Collaborator call latency (catalog, repository, publisher, hand-off)
// - Publisher circuit breaker state
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub orders_created: IntCounter,
    pub status_transitions: IntCounterVec,
    pub checkouts: IntCounterVec,

    // Queue Metrics
    pub queue_messages: IntCounterVec,

    // Collaborator Metrics
    pub call_duration: HistogramVec,
    pub call_failures: IntCounterVec,

    // Circuit Breaker Metrics
    pub circuit_breaker_state: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Metrics
        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let status_transitions = IntCounterVec::new(
            Opts::new("order_status_transitions_total", "Order status writes by target status"),
            &["status"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        let checkouts = IntCounterVec::new(
            Opts::new("order_checkouts_total", "Checkout attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(checkouts.clone()))?;

        // Queue Metrics
        let queue_messages = IntCounterVec::new(
            Opts::new("queue_messages_total", "Queue messages handled"),
            &["queue", "outcome"],
        )?;
        registry.register(Box::new(queue_messages.clone()))?;

        // Collaborator Metrics
        let call_duration = HistogramVec::new(
            HistogramOpts::new("collaborator_call_duration_seconds", "Collaborator call duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["call"],
        )?;
        registry.register(Box::new(call_duration.clone()))?;

        let call_failures = IntCounterVec::new(
            Opts::new("collaborator_call_failures_total", "Failed or timed out collaborator calls"),
            &["call"],
        )?;
        registry.register(Box::new(call_failures.clone()))?;

        // Circuit Breaker Metrics
        let circuit_breaker_state = IntGauge::new(
            "circuit_breaker_state",
            "Publisher circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            status_transitions,
            checkouts,
            queue_messages,
            call_duration,
            call_failures,
            circuit_breaker_state,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_created(&self) {
        self.orders_created.inc();
    }

    pub fn record_status_change(&self, status: &str) {
        self.status_transitions.with_label_values(&[status]).inc();
    }

    /// `outcome` is one of success, transient_failure, rejected
    pub fn record_checkout(&self, outcome: &str) {
        self.checkouts.with_label_values(&[outcome]).inc();
    }

    pub fn record_queue_message(&self, queue: &str, outcome: &str) {
        self.queue_messages.with_label_values(&[queue, outcome]).inc();
    }

    /// Helper to record one collaborator call
    pub fn observe_call(&self, call: &str, duration_secs: f64, success: bool) {
        self.call_duration.with_label_values(&[call]).observe(duration_secs);
        if !success {
            self.call_failures.with_label_values(&[call]).inc();
        }
    }

    /// Helper to update circuit breaker state
    pub fn update_circuit_breaker_state(&self, state: u8) {
        self.circuit_breaker_state.set(state as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_created();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_two_instances_do_not_collide() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.record_order_created();
        assert_eq!(first.orders_created.get(), 1);
        assert_eq!(second.orders_created.get(), 0);
    }

    #[test]
    fn test_record_status_and_checkout() {
        let metrics = Metrics::new().unwrap();
        metrics.record_status_change("PAYED");
        metrics.record_status_change("PAYED");
        metrics.record_checkout("success");
        metrics.record_checkout("rejected");

        assert_eq!(metrics.status_transitions.with_label_values(&["PAYED"]).get(), 2);
        assert_eq!(metrics.checkouts.with_label_values(&["success"]).get(), 1);
        assert_eq!(metrics.checkouts.with_label_values(&["rejected"]).get(), 1);
    }

    #[test]
    fn test_observe_call_counts_failures_only() {
        let metrics = Metrics::new().unwrap();
        metrics.observe_call("catalog", 0.02, true);
        metrics.observe_call("catalog", 5.0, false);

        assert_eq!(metrics.call_duration.with_label_values(&["catalog"]).get_sample_count(), 2);
        assert_eq!(metrics.call_failures.with_label_values(&["catalog"]).get(), 1);
    }

    #[test]
    fn test_queue_and_circuit_breaker_metrics() {
        let metrics = Metrics::new().unwrap();
        metrics.record_queue_message("order_queue", "processed");
        metrics.update_circuit_breaker_state(1); // Open

        assert_eq!(
            metrics
                .queue_messages
                .with_label_values(&["order_queue", "processed"])
                .get(),
            1
        );
        assert_eq!(metrics.circuit_breaker_state.get(), 1);
    }
}
