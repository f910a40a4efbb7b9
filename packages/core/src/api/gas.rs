//! Gas price endpoint

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::SnapshotStore;
use super::headers::{conditional_json, CachePolicy};

/// Shared state for the gas price route.
pub type GasState = Arc<SnapshotStore>;

/// A new snapshot lands at most once per block.
const GAS_CACHE_POLICY: CachePolicy = CachePolicy {
    max_age: 2,
    stale_while_revalidate: 10,
};

/// `GET /eth`: the latest published estimate.
///
/// Before the first successful cycle this answers `503` with an error body
/// instead of an empty estimate.
pub async fn current_gas_price(
    State(store): State<GasState>,
    request_headers: HeaderMap,
) -> Response {
    let Some(snapshot) = store.read().await else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CACHE_CONTROL, "no-store")],
            Json(json!({ "error": "gas price estimate not yet available" })),
        )
            .into_response();
    };

    match serde_json::to_vec(snapshot.as_ref()) {
        Ok(body) => conditional_json(
            &request_headers,
            GAS_CACHE_POLICY,
            snapshot.published_at,
            body,
        ),
        Err(err) => {
            tracing::error!("Failed to serialize gas price snapshot: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to encode estimate" })),
            )
                .into_response()
        }
    }
}
