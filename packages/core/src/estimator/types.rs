//! Core data types for fee estimation

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fee amount in wei.
pub type Wei = u128;

const WEI_PER_GWEI: f64 = 1e9;

/// Display-scale conversion, for logs and gauges only.
pub fn wei_to_gwei(wei: Wei) -> f64 {
    wei as f64 / WEI_PER_GWEI
}

/// Highest percentile a node accepts in `eth_feeHistory`.
pub const MAX_PERCENTILE: u8 = 100;

/// Ascending, de-duplicated reward percentiles requested from the node.
///
/// Built once at startup; the node's per-block reward arrays are
/// positionally aligned with this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentileSet(Vec<u8>);

impl PercentileSet {
    pub fn new(percentiles: impl IntoIterator<Item = u8>) -> Result<Self, String> {
        let mut values: Vec<u8> = percentiles.into_iter().collect();
        if let Some(bad) = values.iter().find(|p| **p > MAX_PERCENTILE) {
            return Err(format!("percentile {} is outside 0..=100", bad));
        }
        values.sort_unstable();
        values.dedup();
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, percentile: u8) -> bool {
        self.0.binary_search(&percentile).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

/// Named speed levels ("safeLow", "fast", ...) and the percentile each one
/// reads its priority fee from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedLevels {
    by_name: BTreeMap<String, u8>,
}

impl SpeedLevels {
    pub fn new(by_name: BTreeMap<String, u8>) -> Result<Self, String> {
        if by_name.is_empty() {
            return Err("at least one speed level must be configured".to_string());
        }
        for (name, percentile) in &by_name {
            if name.trim().is_empty() {
                return Err("speed level names must not be empty".to_string());
            }
            if *percentile > MAX_PERCENTILE {
                return Err(format!(
                    "level {:?} uses percentile {} outside 0..=100",
                    name, percentile
                ));
            }
        }
        Ok(Self { by_name })
    }

    pub fn percentile_of(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    /// All level names reading from `percentile`, in name order.
    pub fn names_for(&self, percentile: u8) -> Vec<&str> {
        self.by_name
            .iter()
            .filter(|(_, p)| **p == percentile)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Levels ordered by ascending percentile, ties broken by name.
    pub fn ordered(&self) -> Vec<(&str, u8)> {
        let mut levels: Vec<(&str, u8)> = self
            .by_name
            .iter()
            .map(|(name, p)| (name.as_str(), *p))
            .collect();
        levels.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        levels
    }

    pub fn percentiles(&self) -> PercentileSet {
        PercentileSet(dedup_sorted(self.by_name.values().copied()))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn dedup_sorted(values: impl Iterator<Item = u8>) -> Vec<u8> {
    let mut values: Vec<u8> = values.collect();
    values.sort_unstable();
    values.dedup();
    values
}

/// Fees observed in one historical block. All fees are in wei.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFeeSample {
    pub base_fee: Wei,
    /// Priority fee keyed by percentile. A percentile whose reward failed
    /// to decode is absent.
    pub priority_fees_by_percentile: BTreeMap<u8, Wei>,
    pub gas_used_ratio: f64,
}

/// Mean priority fee per percentile across the sample window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoricalFeesAverage(BTreeMap<u8, Wei>);

impl HistoricalFeesAverage {
    pub fn get(&self, percentile: u8) -> Option<Wei> {
        self.0.get(&percentile).copied()
    }

    pub fn percentiles(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Wei)> + '_ {
        self.0.iter().map(|(p, fee)| (*p, *fee))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u8, Wei)> for HistoricalFeesAverage {
    fn from_iter<I: IntoIterator<Item = (u8, Wei)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Suggested EIP-1559 fee pair for one speed level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasPriceEstimate {
    #[serde(rename = "speed")]
    pub speed_name: String,
    pub max_fee_per_gas: Wei,
    pub max_priority_fee_per_gas: Wei,
}

/// The published result of one successful polling cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasPriceSnapshot {
    #[serde(rename = "last_block")]
    pub last_block_number: u64,
    pub base_fee_per_gas: Wei,
    #[serde(rename = "price_levels")]
    pub levels: Vec<GasPriceEstimate>,
    #[serde(skip)]
    pub published_at: DateTime<Utc>,
}
