use std::path::PathBuf;

use clap::Parser;

/// EIP-1559 gas estimator CLI arguments
///
/// Every override falls back to the matching environment variable, then
/// to the config file.
#[derive(Debug, Default, Parser)]
#[command(
    name = "eip1559-gas-estimator",
    version,
    about = "Continuously estimates EIP-1559 gas fee levels from node fee history"
)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, env = "GAS_ESTIMATOR_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Node JSON-RPC endpoint
    #[arg(long, env = "GAS_ESTIMATOR_NODE")]
    pub node: Option<String>,

    /// HTTP listen address, e.g. 0.0.0.0:8080
    #[arg(long, env = "GAS_ESTIMATOR_LISTEN")]
    pub listen: Option<String>,

    /// Number of trailing blocks to average
    #[arg(long, env = "GAS_ESTIMATOR_ANALYZE_BLOCKS")]
    pub analyze_blocks: Option<u64>,

    /// Polling interval in seconds
    #[arg(long, env = "GAS_ESTIMATOR_SLEEP_SECONDS")]
    pub sleep_seconds: Option<u64>,
}
