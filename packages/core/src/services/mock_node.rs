//! Scripted `NodeProvider` for engine and scheduler tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::estimator::error::EstimatorError;
use crate::estimator::provider::{NodeProvider, ProviderResult, RawFeeHistory};
use crate::estimator::types::Wei;
use crate::hex;

/// Returns queued chain heads in order, repeating the last one once the
/// queue drains. Base fee and fee history are fixed unless an error is set.
#[derive(Default)]
pub struct MockNodeClient {
    heads: Mutex<VecDeque<ProviderResult<u64>>>,
    last_head: Mutex<Option<u64>>,
    head_delay: Option<Duration>,
    base_fee: Wei,
    history: RawFeeHistory,
    history_errors: Mutex<VecDeque<EstimatorError>>,
    pub block_number_calls: AtomicUsize,
    pub base_fee_calls: AtomicUsize,
    pub fee_history_calls: AtomicUsize,
}

impl MockNodeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heads(self, heads: impl IntoIterator<Item = u64>) -> Self {
        self.heads
            .lock()
            .expect("mock heads lock poisoned")
            .extend(heads.into_iter().map(Ok));
        self
    }

    pub fn with_head_error(self, error: EstimatorError) -> Self {
        self.heads
            .lock()
            .expect("mock heads lock poisoned")
            .push_back(Err(error));
        self
    }

    /// Hold every `block_number` call for `delay` before answering.
    pub fn with_head_delay(mut self, delay: Duration) -> Self {
        self.head_delay = Some(delay);
        self
    }

    pub fn with_base_fee(mut self, base_fee: Wei) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// One reward row per block, each row aligned with the request's percentiles.
    pub fn with_rewards(mut self, rows: Vec<Vec<Wei>>) -> Self {
        self.history = RawFeeHistory {
            oldest_block: hex::encode(1),
            base_fee_per_gas: rows.iter().map(|_| hex::encode(self.base_fee)).collect(),
            gas_used_ratio: rows.iter().map(|_| 0.5).collect(),
            reward: rows
                .into_iter()
                .map(|row| row.into_iter().map(hex::encode).collect())
                .collect(),
        };
        self
    }

    pub fn with_history(mut self, history: RawFeeHistory) -> Self {
        self.history = history;
        self
    }

    /// Fail the next fee history call with `error`.
    pub fn with_history_error(self, error: EstimatorError) -> Self {
        self.history_errors
            .lock()
            .expect("mock history lock poisoned")
            .push_back(error);
        self
    }

    pub fn fee_history_calls(&self) -> usize {
        self.fee_history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeProvider for MockNodeClient {
    async fn block_number(&self) -> ProviderResult<u64> {
        self.block_number_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.head_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.heads.lock().expect("mock heads lock poisoned").pop_front();
        let mut last = self.last_head.lock().expect("mock heads lock poisoned");
        match next {
            Some(Ok(head)) => {
                *last = Some(head);
                Ok(head)
            }
            Some(Err(err)) => Err(err),
            None => last.ok_or_else(|| EstimatorError::fetch("no mock chain head configured")),
        }
    }

    async fn base_fee_at(&self, _block_number: u64) -> ProviderResult<Wei> {
        self.base_fee_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.base_fee)
    }

    async fn fee_history(
        &self,
        _block_count: u64,
        _percentiles: &[u8],
    ) -> ProviderResult<RawFeeHistory> {
        self.fee_history_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self
            .history_errors
            .lock()
            .expect("mock history lock poisoned")
            .pop_front()
        {
            return Err(err);
        }
        Ok(self.history.clone())
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
