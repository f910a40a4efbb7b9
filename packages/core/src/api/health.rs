use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::gas::GasState;

/// Ready once the first estimate has been published.
pub async fn health(State(store): State<GasState>) -> impl IntoResponse {
    let (status, body) = match store.read().await {
        Some(_) => (StatusCode::OK, "ok"),
        None => (StatusCode::SERVICE_UNAVAILABLE, "starting"),
    };

    Response::builder()
        .status(status)
        .header(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))
        .body(Body::from(body))
        .expect("health response should be valid")
}
