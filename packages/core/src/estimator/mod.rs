//! EIP-1559 Fee Estimation
//!
//! Turns the node's fee history into per-level `maxFeePerGas` /
//! `maxPriorityFeePerGas` suggestions and publishes them as one snapshot
//! per new chain head.

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod levels;
pub mod provider;
pub mod types;

pub use engine::{CycleOutcome, EngineConfig, EngineState, EstimationEngine};
pub use error::EstimatorError;
pub use provider::{NodeProvider, RawFeeHistory};
pub use types::*;
