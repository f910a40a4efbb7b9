//! Speed level pricing.

use crate::estimator::{
    error::EstimatorError,
    types::{GasPriceEstimate, HistoricalFeesAverage, SpeedLevels, Wei},
};

/// Base fee headroom: the base fee can at most double over the next two blocks.
pub const BASE_FEE_MULTIPLIER: Wei = 2;

/// Price every configured level from the averaged priority fees.
///
/// `max_priority_fee_per_gas` is the level's averaged priority fee and
/// `max_fee_per_gas` adds `BASE_FEE_MULTIPLIER * base_fee` on top.
/// Output is ordered by ascending percentile, then level name.
pub fn compute_levels(
    base_fee: Wei,
    averages: &HistoricalFeesAverage,
    levels: &SpeedLevels,
) -> Result<Vec<GasPriceEstimate>, EstimatorError> {
    let headroom = base_fee
        .checked_mul(BASE_FEE_MULTIPLIER)
        .ok_or_else(|| EstimatorError::overflow("base fee headroom"))?;

    levels
        .ordered()
        .into_iter()
        .map(|(name, percentile)| {
            let priority_fee = averages
                .get(percentile)
                .ok_or(EstimatorError::UnknownPercentile { percentile })?;
            let max_fee_per_gas = priority_fee
                .checked_add(headroom)
                .ok_or_else(|| EstimatorError::overflow(format!("max fee for level {}", name)))?;

            Ok(GasPriceEstimate {
                speed_name: name.to_string(),
                max_fee_per_gas,
                max_priority_fee_per_gas: priority_fee,
            })
        })
        .collect()
}
