use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_BREAK_SECS: u64 = 30;

/// Longest accepted BREAK. Larger values fall back to `DEFAULT_BREAK_SECS`.
pub const MAX_BREAK_SECS: u64 = 7 * 24 * 60 * 60;

/// Seconds before `breakEndsAt` at which the holder snapshot is taken.
pub const PRE_SNAPSHOT_LEEWAY_SECS: u64 = 5;

/// Seed for round `n` is `n * SEED_MULTIPLIER`.
pub const SEED_MULTIPLIER: u64 = 1337;

pub const DEFAULT_TOKEN_ADDRESS: &str = "So11111111111111111111111111111111111111112";

/// Which holder snapshot source to wire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSourceType {
    /// Always empty; every round uses the placeholder holder set.
    #[default]
    Noop,
    /// Fixed address list from `static_holders`.
    Static,
}

/// Which fee collector to wire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeeCollectorType {
    #[default]
    Noop,
}

/// Base configuration for the service, from CLI flags or `ROUNDSMITH_*` env vars.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "roundsmith", about = "Four-team holder battle round scheduler")]
pub struct BaseConfig {
    /// Path for persistent storage (RocksDB).
    #[arg(long, env = "ROUNDSMITH_STORAGE_PATH", default_value = "./data")]
    pub storage_path: String,

    /// Identifier of the tracked asset whose holders are snapshotted.
    #[arg(long, env = "ROUNDSMITH_TOKEN_ADDRESS", default_value = DEFAULT_TOKEN_ADDRESS)]
    pub token_address: String,

    /// Length of the BREAK countdown in seconds.
    #[arg(long, env = "ROUNDSMITH_BREAK_SECS", default_value_t = DEFAULT_BREAK_SECS)]
    pub break_secs: u64,

    /// Snapshot lead time; fixed.
    #[arg(skip = PRE_SNAPSHOT_LEEWAY_SECS)]
    pub pre_snapshot_secs: u64,

    /// Scheduler cadence in milliseconds.
    #[arg(long, env = "ROUNDSMITH_TICK_INTERVAL_MS", default_value_t = 1000)]
    pub tick_interval_ms: u64,

    /// Size of the fallback holder set used when a snapshot comes back empty.
    #[arg(long, env = "ROUNDSMITH_PLACEHOLDER_HOLDERS", default_value_t = 80)]
    pub placeholder_holders: usize,

    /// Upper bound on a single snapshot fetch.
    #[arg(long, env = "ROUNDSMITH_SNAPSHOT_TIMEOUT_SECS", default_value_t = 60)]
    pub snapshot_timeout_secs: u64,

    /// End a RUNNING round without a winner after this many seconds. Disabled when unset.
    #[arg(long, env = "ROUNDSMITH_RUNNING_TIMEOUT_SECS")]
    pub running_timeout_secs: Option<u64>,

    #[arg(long, env = "ROUNDSMITH_SNAPSHOT_SOURCE", value_enum, default_value_t = SnapshotSourceType::Noop)]
    pub snapshot_source: SnapshotSourceType,

    /// Holder addresses served by the `static` snapshot source.
    #[arg(long, env = "ROUNDSMITH_STATIC_HOLDERS", value_delimiter = ',')]
    pub static_holders: Vec<String>,

    #[arg(long, env = "ROUNDSMITH_FEE_COLLECTOR", value_enum, default_value_t = FeeCollectorType::Noop)]
    pub fee_collector: FeeCollectorType,

    /// Run the fee collector every N seconds. Disabled when unset.
    #[arg(long, env = "ROUNDSMITH_FEE_COLLECT_INTERVAL_SECS")]
    pub fee_collect_interval_secs: Option<u64>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            storage_path: "./data".to_string(),
            token_address: DEFAULT_TOKEN_ADDRESS.to_string(),
            break_secs: DEFAULT_BREAK_SECS,
            pre_snapshot_secs: PRE_SNAPSHOT_LEEWAY_SECS,
            tick_interval_ms: 1000,
            placeholder_holders: 80,
            snapshot_timeout_secs: 60,
            running_timeout_secs: None,
            snapshot_source: SnapshotSourceType::Noop,
            static_holders: Vec::new(),
            fee_collector: FeeCollectorType::Noop,
            fee_collect_interval_secs: None,
        }
    }
}

impl BaseConfig {
    /// Replace out-of-range values with their defaults instead of failing later.
    pub fn sanitized(mut self) -> Self {
        if self.break_secs > MAX_BREAK_SECS {
            warn!(
                "break_secs={} exceeds {}, using default {}",
                self.break_secs, MAX_BREAK_SECS, DEFAULT_BREAK_SECS
            );
            self.break_secs = DEFAULT_BREAK_SECS;
        }
        self
    }
}
