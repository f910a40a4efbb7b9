//! Estimation polling scheduler.
//!
//! Drives the main polling loop: each cycle asks the estimation engine to
//! check the chain head and, when it moved, publish a fresh snapshot, so the
//! API layer always serves the newest estimate the node allows.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::estimator::EstimationEngine;

/// Run the estimation loop.
///
/// Each cycle:
/// 1. Return if `shutdown` has been cancelled
/// 2. Run one `EstimationEngine::tick` (errors are logged inside)
/// 3. Sleep for `interval`, waking early on shutdown
///
/// A failed cycle is never retried immediately; the next cycle is the retry.
/// Cancellation also abandons an in-flight cycle, so a stalled node never
/// holds up shutdown.
pub async fn run_estimation_loop(
    mut engine: EstimationEngine,
    interval: Duration,
    shutdown: CancellationToken,
) -> EstimationEngine {
    tracing::info!(
        provider = engine.provider_name(),
        percentiles = ?engine.percentiles().as_slice(),
        "Estimation polling started (interval: {}s)",
        interval.as_secs()
    );

    loop {
        if shutdown.is_cancelled() {
            break;
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested during an estimation cycle");
                break;
            }
            _ = engine.tick() => {}
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = time::sleep(interval) => {}
        }
    }

    tracing::info!("Estimation polling stopped cleanly");
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::num::NonZeroU64;
    use std::sync::Arc;

    use crate::estimator::{EngineConfig, EngineState, EstimatorError, SpeedLevels};
    use crate::services::mock_node::MockNodeClient;
    use crate::store::SnapshotStore;

    fn make_engine(node: Arc<MockNodeClient>, store: Arc<SnapshotStore>) -> EstimationEngine {
        let levels = SpeedLevels::new(BTreeMap::from([
            ("average".to_string(), 10),
            ("safeLow".to_string(), 5),
        ]))
        .unwrap();
        EstimationEngine::new(
            EngineConfig {
                block_count: NonZeroU64::new(2).unwrap(),
                levels,
            },
            node,
            store,
        )
    }

    fn two_block_node() -> MockNodeClient {
        MockNodeClient::new()
            .with_base_fee(1_000)
            .with_rewards(vec![vec![100, 200], vec![300, 400]])
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_runs_no_cycle() {
        let node = Arc::new(two_block_node().with_heads([1]));
        let store = Arc::new(SnapshotStore::new());
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let engine = run_estimation_loop(
            make_engine(node.clone(), store.clone()),
            Duration::from_secs(5),
            shutdown,
        )
        .await;

        assert_eq!(engine.state(), EngineState::Idle);
        assert!(store.read().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_publishes_then_sleeps_until_shutdown() {
        let node = Arc::new(two_block_node().with_heads([42]));
        let store = Arc::new(SnapshotStore::new());
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(run_estimation_loop(
            make_engine(node.clone(), store.clone()),
            Duration::from_secs(60),
            shutdown.clone(),
        ));

        // Let the first cycle run; the loop then parks on its 60s sleep.
        time::sleep(Duration::from_secs(1)).await;
        let snapshot = store.read().await.expect("first cycle publishes");
        assert_eq!(snapshot.last_block_number, 42);
        assert_eq!(snapshot.levels[0].max_priority_fee_per_gas, 200);

        shutdown.cancel();
        let engine = handle.await.unwrap();
        assert_eq!(engine.state(), EngineState::Sleeping);
        assert_eq!(node.fee_history_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_head_across_ticks_fetches_history_once() {
        let node = Arc::new(two_block_node().with_heads([42]));
        let store = Arc::new(SnapshotStore::new());
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(run_estimation_loop(
            make_engine(node.clone(), store.clone()),
            Duration::from_secs(3),
            shutdown.clone(),
        ));

        time::sleep(Duration::from_secs(10)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert!(node.block_number_calls.load(std::sync::atomic::Ordering::SeqCst) >= 3);
        assert_eq!(node.fee_history_calls(), 1);
        assert_eq!(store.last_block().await, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_node_never_publishes_and_loop_keeps_running() {
        let node = Arc::new(
            MockNodeClient::new()
                .with_head_error(EstimatorError::fetch("down"))
                .with_head_error(EstimatorError::fetch("down")),
        );
        let store = Arc::new(SnapshotStore::new());
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(run_estimation_loop(
            make_engine(node.clone(), store.clone()),
            Duration::from_secs(1),
            shutdown.clone(),
        ));

        time::sleep(Duration::from_millis(3_500)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert!(store.read().await.is_none());
        assert!(node.block_number_calls.load(std::sync::atomic::Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_abandons_a_stalled_cycle() {
        let node = Arc::new(
            two_block_node()
                .with_heads([42])
                .with_head_delay(Duration::from_secs(3_600)),
        );
        let store = Arc::new(SnapshotStore::new());
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(run_estimation_loop(
            make_engine(node.clone(), store.clone()),
            Duration::from_secs(3),
            shutdown.clone(),
        ));

        time::sleep(Duration::from_secs(1)).await;
        shutdown.cancel();

        let engine = time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop should stop while the node is stalled")
            .unwrap();
        assert_eq!(engine.last_processed_block(), None);
        assert_eq!(node.fee_history_calls(), 0);
        assert!(store.read().await.is_none());
    }
}
