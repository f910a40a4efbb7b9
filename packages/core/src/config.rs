use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroU64;
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::estimator::{EngineConfig, SpeedLevels, MAX_PERCENTILE};

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_host: String,
    pub node_endpoint: String,
    /// Fee history window size in blocks.
    pub analyze_blocks: NonZeroU64,
    /// Pause between polling cycles. `sleep_seconds` is read in seconds.
    pub poll_interval: Duration,
    pub levels: SpeedLevels,
}

/// On-disk layout of `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    node: Option<String>,
    analyze_blocks: Option<i64>,
    sleep_seconds: Option<i64>,
    #[serde(default)]
    levels: BTreeMap<String, PercentileValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    host: Option<String>,
}

/// Percentiles are documented as strings but bare integers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PercentileValue {
    Number(i64),
    Text(String),
}

impl PercentileValue {
    fn parse(&self, level: &str) -> Result<u8, String> {
        let value = match self {
            PercentileValue::Number(n) => *n,
            PercentileValue::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                format!("levels.{} must be an integer percentile, got {:?}", level, s)
            })?,
        };
        u8::try_from(value)
            .ok()
            .filter(|p| *p <= MAX_PERCENTILE)
            .ok_or_else(|| format!("levels.{} must be within 0..=100, got {}", level, value))
    }
}

impl Config {
    /// Read the config file named by `cli` and apply its overrides.
    pub fn load(cli: &Cli) -> Result<Self, String> {
        let raw = fs::read_to_string(&cli.config)
            .map_err(|err| format!("cannot read {}: {}", cli.config.display(), err))?;
        Self::from_toml(&raw, cli)
    }

    /// Parse TOML config text, then let CLI/env values override it.
    pub fn from_toml(raw: &str, cli: &Cli) -> Result<Self, String> {
        let file: FileConfig =
            toml::from_str(raw).map_err(|err| format!("invalid config file: {}", err))?;

        let listen_host = required(cli.listen.clone().or(file.server.host), "server.host")?;
        let node_endpoint = required(cli.node.clone().or(file.node), "node")?;

        let analyze_blocks = match cli.analyze_blocks {
            Some(blocks) => blocks,
            None => non_negative(
                file.analyze_blocks.ok_or("analyze_blocks is required")?,
                "analyze_blocks",
            )?,
        };
        let analyze_blocks = NonZeroU64::new(analyze_blocks)
            .ok_or("analyze_blocks must be at least 1, got 0")?;

        let sleep_seconds = match cli.sleep_seconds {
            Some(seconds) => seconds,
            None => non_negative(
                file.sleep_seconds.ok_or("sleep_seconds is required")?,
                "sleep_seconds",
            )?,
        };

        let levels = file
            .levels
            .iter()
            .map(|(name, value)| value.parse(name).map(|p| (name.clone(), p)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        let levels = SpeedLevels::new(levels)?;

        Ok(Self {
            listen_host,
            node_endpoint,
            analyze_blocks,
            poll_interval: Duration::from_secs(sleep_seconds),
            levels,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            block_count: self.analyze_blocks,
            levels: self.levels.clone(),
        }
    }
}

fn non_negative(value: i64, key: &str) -> Result<u64, String> {
    u64::try_from(value).map_err(|_| format!("{} must not be negative, got {}", key, value))
}

fn required(value: Option<String>, key: &str) -> Result<String, String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("{} is required", key))
}
