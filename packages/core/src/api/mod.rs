//! Read-only HTTP surface over the published snapshot.

pub mod gas;
pub mod headers;
pub mod health;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::metrics::AppMetrics;
use crate::store::SnapshotStore;

/// Assemble the full router: `/eth`, `/health` and `/metrics`.
pub fn create_router(store: Arc<SnapshotStore>, metrics: Arc<AppMetrics>) -> Router {
    let snapshot_routes = Router::new()
        .route("/eth", get(gas::current_gas_price))
        .route("/health", get(health::health))
        .with_state(store);

    let metrics_routes = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics.clone());

    Router::new()
        .merge(snapshot_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn_with_state(metrics, track_http))
        .layer(CorsLayer::permissive())
}

async fn render_metrics(State(metrics): State<Arc<AppMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Body::from(body))
            .expect("metrics response should be valid"),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from("metrics error"))
                .expect("metrics error response should be valid")
        }
    }
}

async fn track_http(
    State(metrics): State<Arc<AppMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    metrics
        .http_requests_total
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();
    metrics
        .http_request_duration
        .observe(started.elapsed().as_secs_f64());

    response
}
