//! Window averaging of per-percentile priority fees.

use crate::estimator::{
    error::EstimatorError,
    types::{BlockFeeSample, HistoricalFeesAverage, PercentileSet, Wei},
};

/// Average the priority fee of every percentile in `percentiles` across
/// `samples`.
///
/// The mean uses truncating integer division. Samples lacking a percentile
/// are left out of that percentile's mean.
pub fn average(
    samples: &[BlockFeeSample],
    percentiles: &PercentileSet,
) -> Result<HistoricalFeesAverage, EstimatorError> {
    if samples.is_empty() {
        return Err(EstimatorError::EmptyWindow { percentile: None });
    }

    percentiles
        .iter()
        .map(|percentile| {
            let values: Vec<Wei> = samples
                .iter()
                .filter_map(|sample| sample.priority_fees_by_percentile.get(&percentile))
                .copied()
                .collect();

            if values.is_empty() {
                return Err(EstimatorError::EmptyWindow {
                    percentile: Some(percentile),
                });
            }

            let total = values
                .iter()
                .try_fold(0 as Wei, |acc, value| acc.checked_add(*value))
                .ok_or_else(|| {
                    EstimatorError::overflow(format!("sum of rewards at percentile {}", percentile))
                })?;

            Ok((percentile, total / values.len() as Wei))
        })
        .collect()
}
