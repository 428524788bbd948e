//! Prometheus metrics for the relay.
//!
//! Counters track how each inbound event ended and how the upstream qTest
//! and Teams calls went; a histogram tracks end-to-end pipeline latency.
//!
//! # Example
//! ```no_run
//! use qtest_teams_relay::metrics::EVENTS_TOTAL;
//!
//! EVENTS_TOTAL.with_label_values(&["delivered"]).inc();
//! ```

use lazy_static::lazy_static;
use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry};

const NAMESPACE: &str = "qtest_teams_relay";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Inbound events by pipeline outcome
    ///
    /// Labels: outcome (delivered, skipped, failed)
    pub static ref EVENTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("events_total", "Total number of test-log events processed")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create EVENTS_TOTAL metric");

    /// Upstream HTTP calls
    ///
    /// Labels: target (test_run, project, test_suite, teams), outcome (success, error)
    pub static ref UPSTREAM_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("upstream_requests_total", "Total number of qTest and Teams requests")
            .namespace(NAMESPACE),
        &["target", "outcome"]
    ).expect("Failed to create UPSTREAM_REQUESTS_TOTAL metric");

    /// End-to-end pipeline duration in seconds
    pub static ref PIPELINE_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "pipeline_duration_seconds",
            "Time from event receipt to pipeline outcome in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    ).expect("Failed to create PIPELINE_DURATION_SECONDS metric");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(Box::new(EVENTS_TOTAL.clone()))?;
    register(Box::new(UPSTREAM_REQUESTS_TOTAL.clone()))?;
    register(Box::new(PIPELINE_DURATION_SECONDS.clone()))?;
    Ok(())
}

fn register(collector: Box<dyn prometheus::core::Collector>) -> Result<(), prometheus::Error> {
    match PROMETHEUS_REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Record the outcome of one upstream call
pub fn record_upstream(target: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    UPSTREAM_REQUESTS_TOTAL
        .with_label_values(&[target, outcome])
        .inc();
}

/// Encode the registry in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
