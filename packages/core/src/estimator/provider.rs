//! Node Data Provider Interface
//!
//! Abstracts the execution node so the engine can be driven by the JSON-RPC
//! client in production and by scripted mocks in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::estimator::{error::EstimatorError, types::Wei};

/// Raw `eth_feeHistory` result, still hex-encoded.
///
/// `reward` is indexed `[block][percentile position]`, aligned with the
/// percentiles of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeeHistory {
    pub oldest_block: String,
    #[serde(default)]
    pub reward: Vec<Vec<String>>,
    pub base_fee_per_gas: Vec<String>,
    pub gas_used_ratio: Vec<f64>,
}

/// Trait for execution nodes the estimator can poll
#[async_trait]
pub trait NodeProvider {
    /// Current chain head block number.
    async fn block_number(&self) -> Result<u64, EstimatorError>;

    /// Base fee of the given block.
    async fn base_fee_at(&self, block_number: u64) -> Result<Wei, EstimatorError>;

    /// Fee history for `block_count` blocks ending at the chain head, with
    /// rewards sampled at `percentiles`. No retry happens here.
    async fn fee_history(
        &self,
        block_count: u64,
        percentiles: &[u8],
    ) -> Result<RawFeeHistory, EstimatorError>;

    /// Name of this provider for logging/debugging
    fn provider_name(&self) -> &str;
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, EstimatorError>;
