//! Prometheus metrics registry for the gas estimator.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the estimation engine and HTTP middleware.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{
    Counter, CounterVec, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry,
};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Total number of estimation cycles started.
    pub polls_total: IntCounter,
    /// Failed cycles, labelled by error kind.
    pub poll_errors_total: CounterVec,
    /// Cycles skipped because the chain head had not moved.
    pub unchanged_head_total: IntCounter,
    /// Fee history fields dropped because they failed to decode.
    pub malformed_fields_total: IntCounter,
    /// Block number of the latest published snapshot.
    pub last_published_block: IntGauge,
    /// Base fee of the latest published snapshot, in Gwei.
    pub base_fee_gwei: Gauge,
    /// HTTP request count, labelled by method, path, and status code.
    pub http_requests_total: CounterVec,
    /// HTTP request latency histogram in seconds.
    pub http_request_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let polls_total = IntCounter::with_opts(Opts::new(
            "gas_estimator_polls_total",
            "Total estimation cycles started",
        ))?;

        let poll_errors_total = CounterVec::new(
            Opts::new(
                "gas_estimator_poll_errors_total",
                "Failed estimation cycles by error kind",
            ),
            &["kind"],
        )?;

        let unchanged_head_total = IntCounter::with_opts(Opts::new(
            "gas_estimator_unchanged_head_total",
            "Cycles skipped because the chain head did not change",
        ))?;

        let malformed_fields_total = IntCounter::with_opts(Opts::new(
            "gas_estimator_malformed_fields_total",
            "Fee history fields skipped due to malformed hex",
        ))?;

        let last_published_block = IntGauge::with_opts(Opts::new(
            "gas_estimator_last_published_block",
            "Block number of the latest published estimate",
        ))?;

        let base_fee_gwei = Gauge::with_opts(Opts::new(
            "gas_estimator_base_fee_gwei",
            "Base fee of the latest published estimate in Gwei",
        ))?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "gas_estimator_http_requests_total",
                "HTTP requests by method, path, and status",
            ),
            &["method", "path", "status"],
        )?;

        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "gas_estimator_http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(poll_errors_total.clone()))?;
        registry.register(Box::new(unchanged_head_total.clone()))?;
        registry.register(Box::new(malformed_fields_total.clone()))?;
        registry.register(Box::new(last_published_block.clone()))?;
        registry.register(Box::new(base_fee_gwei.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            polls_total,
            poll_errors_total,
            unchanged_head_total,
            malformed_fields_total,
            last_published_block,
            base_fee_gwei,
            http_requests_total,
            http_request_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }

    pub fn poll_error(&self, kind: &str) -> Counter {
        self.poll_errors_total.with_label_values(&[kind])
    }
}
