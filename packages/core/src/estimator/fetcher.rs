//! Fee history retrieval and decoding into per-block samples.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::estimator::{
    error::EstimatorError,
    provider::{NodeProvider, RawFeeHistory},
    types::{BlockFeeSample, PercentileSet},
};
use crate::hex;

/// Fields skipped while decoding, reported so callers can count them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeReport {
    pub skipped_blocks: usize,
    pub skipped_rewards: usize,
}

impl DecodeReport {
    pub fn skipped_fields(&self) -> usize {
        self.skipped_blocks + self.skipped_rewards
    }
}

/// Pulls the trailing fee-history window from a node.
pub struct FeeHistoryFetcher {
    provider: Arc<dyn NodeProvider + Send + Sync>,
}

impl FeeHistoryFetcher {
    pub fn new(provider: Arc<dyn NodeProvider + Send + Sync>) -> Self {
        Self { provider }
    }

    /// Request `block_count` blocks ending at the chain head, sampled at
    /// exactly the percentiles of `percentiles`, in order.
    pub async fn fetch(
        &self,
        block_count: u64,
        percentiles: &PercentileSet,
    ) -> Result<RawFeeHistory, EstimatorError> {
        self.provider
            .fee_history(block_count, percentiles.as_slice())
            .await
    }
}

/// Decode a raw fee history into one sample per block.
///
/// A block whose base fee is malformed is dropped and a malformed reward
/// drops only that percentile from its block; both are logged. A reward
/// row whose length differs from the percentile count aborts the decode.
pub fn decode(
    raw: &RawFeeHistory,
    percentiles: &PercentileSet,
) -> Result<(Vec<BlockFeeSample>, DecodeReport), EstimatorError> {
    let mut samples = Vec::with_capacity(raw.reward.len());
    let mut report = DecodeReport::default();

    for (block_index, rewards) in raw.reward.iter().enumerate() {
        if rewards.len() != percentiles.len() {
            return Err(EstimatorError::LengthMismatch {
                block_index,
                expected: percentiles.len(),
                actual: rewards.len(),
            });
        }

        let (raw_base_fee, gas_used_ratio) = match (
            raw.base_fee_per_gas.get(block_index),
            raw.gas_used_ratio.get(block_index),
        ) {
            (Some(base_fee), Some(ratio)) => (base_fee, *ratio),
            _ => {
                return Err(EstimatorError::fetch(format!(
                    "fee history has {} reward rows but only {} base fees and {} gas ratios",
                    raw.reward.len(),
                    raw.base_fee_per_gas.len(),
                    raw.gas_used_ratio.len()
                )))
            }
        };

        let base_fee = match hex::decode(raw_base_fee) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(block_index, "Skipping fee history block: {}", err);
                report.skipped_blocks += 1;
                continue;
            }
        };

        let mut priority_fees_by_percentile = BTreeMap::new();
        for (percentile, reward) in percentiles.iter().zip(rewards) {
            match hex::decode(reward) {
                Ok(value) => {
                    priority_fees_by_percentile.insert(percentile, value);
                }
                Err(err) => {
                    tracing::warn!(block_index, percentile, "Skipping reward: {}", err);
                    report.skipped_rewards += 1;
                }
            }
        }

        samples.push(BlockFeeSample {
            base_fee,
            priority_fees_by_percentile,
            gas_used_ratio,
        });
    }

    Ok((samples, report))
}
