//! Published gas price snapshot.
//!
//! `SnapshotStore` holds the most recent `GasPriceSnapshot` behind an
//! `Arc`. Publishing swaps the whole `Arc` under a write lock; readers
//! clone the `Arc` under a read lock and release it immediately, so a
//! reader sees one complete snapshot and never one being built.
//!
//! The estimation loop is the only writer. Axum handlers share the store
//! as `Arc<SnapshotStore>`.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::estimator::types::GasPriceSnapshot;

#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<GasPriceSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored snapshot.
    pub async fn publish(&self, snapshot: GasPriceSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = Some(snapshot);
    }

    /// The latest snapshot, or `None` until the first publish.
    pub async fn read(&self) -> Option<Arc<GasPriceSnapshot>> {
        self.current.read().await.clone()
    }

    /// Block number of the latest snapshot, if any.
    pub async fn last_block(&self) -> Option<u64> {
        self.read().await.map(|s| s.last_block_number)
    }
}
