//! Estimation Engine - orchestrates one polling cycle end to end

use std::num::NonZeroU64;
use std::sync::Arc;

use chrono::Utc;

use crate::estimator::{
    aggregator,
    error::EstimatorError,
    fetcher::{self, FeeHistoryFetcher},
    levels::compute_levels,
    provider::NodeProvider,
    types::{
        wei_to_gwei, GasPriceSnapshot, HistoricalFeesAverage, PercentileSet, SpeedLevels, Wei,
    },
};
use crate::metrics::AppMetrics;
use crate::store::SnapshotStore;

/// Where the engine is within its polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Polling,
    Aggregating,
    Publishing,
    Sleeping,
}

/// What a completed cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Published {
        block_number: u64,
        base_fee: Wei,
        skipped_fields: usize,
    },
    /// The chain head matched the last processed block; nothing was fetched.
    Unchanged { block_number: u64 },
}

/// Engine settings fixed at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of trailing blocks in the fee history window.
    pub block_count: NonZeroU64,
    pub levels: SpeedLevels,
}

/// Drives detect-head → fetch → aggregate → price → publish, and is the
/// only writer of its `SnapshotStore`.
pub struct EstimationEngine {
    provider: Arc<dyn NodeProvider + Send + Sync>,
    fetcher: FeeHistoryFetcher,
    levels: SpeedLevels,
    percentiles: PercentileSet,
    block_count: NonZeroU64,
    store: Arc<SnapshotStore>,
    metrics: Option<Arc<AppMetrics>>,
    last_processed_block: Option<u64>,
    state: EngineState,
}

impl EstimationEngine {
    pub fn new(
        config: EngineConfig,
        provider: Arc<dyn NodeProvider + Send + Sync>,
        store: Arc<SnapshotStore>,
    ) -> Self {
        let percentiles = config.levels.percentiles();
        Self {
            fetcher: FeeHistoryFetcher::new(provider.clone()),
            provider,
            levels: config.levels,
            percentiles,
            block_count: config.block_count,
            store,
            metrics: None,
            last_processed_block: None,
            state: EngineState::Idle,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn percentiles(&self) -> &PercentileSet {
        &self.percentiles
    }

    pub fn last_processed_block(&self) -> Option<u64> {
        self.last_processed_block
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Run one cycle and leave the engine in `Sleeping`.
    ///
    /// On error nothing is published and the last processed block is kept,
    /// so the next cycle retries the same head.
    pub async fn poll_once(&mut self) -> Result<CycleOutcome, EstimatorError> {
        self.state = EngineState::Polling;
        let outcome = self.run_cycle().await;
        self.state = EngineState::Sleeping;
        outcome
    }

    /// `poll_once` with logging and metrics; never fails.
    pub async fn tick(&mut self) {
        if let Some(metrics) = &self.metrics {
            metrics.polls_total.inc();
        }

        match self.poll_once().await {
            Ok(CycleOutcome::Published {
                block_number,
                base_fee,
                skipped_fields,
            }) => {
                tracing::info!(
                    block_number,
                    base_fee_gwei = wei_to_gwei(base_fee),
                    skipped_fields,
                    "Published gas price estimate"
                );
            }
            Ok(CycleOutcome::Unchanged { block_number }) => {
                tracing::debug!(block_number, "Chain head unchanged, skipping cycle");
                if let Some(metrics) = &self.metrics {
                    metrics.unchanged_head_total.inc();
                }
            }
            Err(err) => {
                tracing::warn!(
                    kind = err.kind(),
                    last_processed_block = self.last_processed_block,
                    "Estimation cycle skipped: {}",
                    err
                );
                if let Some(metrics) = &self.metrics {
                    metrics.poll_error(err.kind()).inc();
                }
            }
        }
    }

    async fn run_cycle(&mut self) -> Result<CycleOutcome, EstimatorError> {
        let head = self.provider.block_number().await?;
        if self.last_processed_block == Some(head) {
            return Ok(CycleOutcome::Unchanged { block_number: head });
        }

        let base_fee = self.provider.base_fee_at(head).await?;
        let raw = self.fetcher.fetch(self.block_count.get(), &self.percentiles).await?;

        self.state = EngineState::Aggregating;
        let (samples, report) = fetcher::decode(&raw, &self.percentiles)?;
        if let Some(metrics) = &self.metrics {
            metrics.malformed_fields_total.inc_by(report.skipped_fields() as u64);
        }
        let averages = aggregator::average(&samples, &self.percentiles)?;
        let levels = compute_levels(base_fee, &averages, &self.levels)?;
        self.log_averages(head, base_fee, &averages);

        self.state = EngineState::Publishing;
        self.store
            .publish(GasPriceSnapshot {
                last_block_number: head,
                base_fee_per_gas: base_fee,
                levels,
                published_at: Utc::now(),
            })
            .await;
        self.last_processed_block = Some(head);

        if let Some(metrics) = &self.metrics {
            metrics.last_published_block.set(head as i64);
            metrics.base_fee_gwei.set(wei_to_gwei(base_fee));
        }

        Ok(CycleOutcome::Published {
            block_number: head,
            base_fee,
            skipped_fields: report.skipped_fields(),
        })
    }

    fn log_averages(&self, head: u64, base_fee: Wei, averages: &HistoricalFeesAverage) {
        tracing::debug!(
            block_number = head,
            base_fee_gwei = wei_to_gwei(base_fee),
            window_blocks = self.block_count.get(),
            "Computed fee history averages"
        );
        for (percentile, fee) in averages.iter() {
            tracing::debug!(
                percentile,
                levels = ?self.levels.names_for(percentile),
                average_gwei = wei_to_gwei(fee),
                "Percentile average"
            );
        }
    }
}
