//! EIP-1559 gas price estimator: polls a node's fee history and serves
//! per-speed fee suggestions over HTTP. The binary lives in `src/main.rs`.

pub mod api;
pub mod error;
pub mod estimator;
pub mod hex;
pub mod metrics;
pub mod scheduler;
pub mod services;
pub mod store;

// Startup-only modules, used by the binary.
pub mod cli;
pub mod config;
pub mod logging;
