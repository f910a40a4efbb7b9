use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use eip1559_gas_estimator::api;
use eip1559_gas_estimator::cli::Cli;
use eip1559_gas_estimator::config::Config;
use eip1559_gas_estimator::error::AppError;
use eip1559_gas_estimator::estimator::EstimationEngine;
use eip1559_gas_estimator::logging::init_logging;
use eip1559_gas_estimator::metrics::AppMetrics;
use eip1559_gas_estimator::scheduler::run_estimation_loop;
use eip1559_gas_estimator::services::node::NodeClient;
use eip1559_gas_estimator::store::SnapshotStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    if let Err(err) = run(Cli::parse()).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::load(&cli).map_err(AppError::Config)?;
    tracing::info!(
        node = %config.node_endpoint,
        analyze_blocks = config.analyze_blocks.get(),
        poll_interval_secs = config.poll_interval.as_secs(),
        levels = config.levels.len(),
        "Service configured"
    );

    let metrics =
        Arc::new(AppMetrics::new().map_err(|err| AppError::Server(err.to_string()))?);
    let store = Arc::new(SnapshotStore::new());

    let listener = TcpListener::bind(&config.listen_host)
        .await
        .map_err(|err| AppError::Network(format!("cannot bind {}: {}", config.listen_host, err)))?;

    let node = Arc::new(
        NodeClient::new(config.node_endpoint.clone())
            .map_err(|err| AppError::Network(format!("cannot build node client: {}", err)))?,
    );
    let engine = EstimationEngine::new(config.engine_config(), node, store.clone())
        .with_metrics(metrics.clone());

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));
    let estimator = tokio::spawn(run_estimation_loop(
        engine,
        config.poll_interval,
        shutdown.clone(),
    ));

    tracing::info!("Starting application on {}", config.listen_host);
    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, api::create_router(store, metrics))
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await;

    // Stop the estimator however the server exited.
    shutdown.cancel();
    estimator
        .await
        .map_err(|err| AppError::Server(format!("estimator task failed: {}", err)))?;

    served.map_err(|err| AppError::Server(err.to_string()))
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => tracing::error!("Failed to listen for shutdown signal: {}", err),
    }
    shutdown.cancel();
}
