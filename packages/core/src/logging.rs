use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Directive used when `RUST_LOG` is unset. Per-percentile averages need
/// `RUST_LOG=eip1559_gas_estimator=debug`.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize structured logging for the application.
///
/// This must be called once at startup (in main.rs).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Logging initialized");
}
