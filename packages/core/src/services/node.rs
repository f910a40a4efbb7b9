//! JSON-RPC transport to an Ethereum execution node.
//!
//! `NodeClient` is the production `NodeProvider`. Every call is a single
//! HTTP POST bounded by a request timeout; transport failures, non-2xx
//! statuses, RPC error objects and timeouts all surface as `FetchError`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::estimator::error::EstimatorError;
use crate::estimator::provider::{NodeProvider, ProviderResult, RawFeeHistory};
use crate::estimator::types::Wei;
use crate::hex;

/// JSON-RPC 2.0 client for an Ethereum execution node.
pub struct NodeClient {
    endpoint: String,
    http: Client,
    next_id: AtomicU64,
}

/// Upper bound for one RPC round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl NodeClient {
    pub fn new(endpoint: String) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    /// A stalled node fails the call after `timeout` instead of hanging.
    pub fn with_timeout(endpoint: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint,
            http,
            next_id: AtomicU64::new(1),
        })
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockHeader {
    base_fee_per_gas: Option<String>,
}

impl NodeClient {
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> ProviderResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| EstimatorError::fetch(format!("{} request failed: {}", method, err)))?;

        if !response.status().is_success() {
            return Err(EstimatorError::fetch(format!(
                "{}: node returned HTTP {}",
                method,
                response.status()
            )));
        }

        let envelope = response
            .json::<RpcResponse<T>>()
            .await
            .map_err(|err| EstimatorError::fetch(format!("{}: invalid response: {}", method, err)))?;

        if let Some(error) = envelope.error {
            return Err(EstimatorError::fetch(format!(
                "{}: node error {}: {}",
                method, error.code, error.message
            )));
        }

        envelope
            .result
            .ok_or_else(|| EstimatorError::fetch(format!("{}: empty result", method)))
    }
}

#[async_trait]
impl NodeProvider for NodeClient {
    async fn block_number(&self) -> ProviderResult<u64> {
        let raw: String = self.call("eth_blockNumber", json!([])).await?;
        hex::decode_u64(&raw)
            .map_err(|err| EstimatorError::fetch(format!("eth_blockNumber: {}", err)))
    }

    async fn base_fee_at(&self, block_number: u64) -> ProviderResult<Wei> {
        let block: BlockHeader = self
            .call(
                "eth_getBlockByNumber",
                json!([hex::encode(block_number as u128), false]),
            )
            .await?;

        let raw = block.base_fee_per_gas.ok_or_else(|| {
            EstimatorError::fetch(format!("block {} has no baseFeePerGas", block_number))
        })?;
        hex::decode(&raw)
            .map_err(|err| EstimatorError::fetch(format!("eth_getBlockByNumber: {}", err)))
    }

    async fn fee_history(
        &self,
        block_count: u64,
        percentiles: &[u8],
    ) -> ProviderResult<RawFeeHistory> {
        self.call("eth_feeHistory", json!([block_count, "latest", percentiles]))
            .await
    }

    fn provider_name(&self) -> &str {
        "json-rpc"
    }
}
