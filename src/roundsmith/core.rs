//! Core RoundSmith struct and initialization - no business logic.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::BaseConfig;
use crate::fees::FeeCollectorVariant;
use crate::scheduler::{PhaseScheduler, RoundSettings};
use crate::snapshot::SnapshotVariant;
use crate::storage::{Bootstrap, StateStore};
use crate::teams::TeamAssigner;

use super::handle::RoundHandle;

/// The store behind the single mutation lock. Every load-mutate-save holds it.
pub type SharedStore = Arc<tokio::sync::Mutex<StateStore>>;

/// Main application orchestrator: owns the round document and drives it.
pub struct RoundSmith {
    /// Holder snapshot source.
    pub snapshot: SnapshotVariant,

    /// External creator-fee collector.
    pub fee_collector: FeeCollectorVariant,

    /// Global/base configuration.
    pub config: BaseConfig,

    /// Persistent round document (RocksDB).
    pub store: SharedStore,
}

impl RoundSmith {
    /// Create a new RoundSmith.
    pub fn new(
        snapshot: SnapshotVariant,
        fee_collector: FeeCollectorVariant,
        config: BaseConfig,
        store: StateStore,
    ) -> Self {
        Self {
            snapshot,
            fee_collector,
            config,
            store: Arc::new(tokio::sync::Mutex::new(store)),
        }
    }

    /// Initialize RoundSmith with the collaborators selected in `config`.
    pub async fn initialize(config: BaseConfig) -> Result<Self> {
        let config = config.sanitized();
        let store = Self::open_store(&config)?;
        info!("Storage opened at: {}", config.storage_path);

        let snapshot = SnapshotVariant::from_config(&config);
        let fee_collector = FeeCollectorVariant::from_config(&config);

        Ok(Self::new(snapshot, fee_collector, config, store))
    }

    pub fn open_store(config: &BaseConfig) -> Result<StateStore> {
        StateStore::open(
            &config.storage_path,
            Bootstrap {
                token_address: config.token_address.clone(),
                break_secs: config.break_secs,
            },
        )
    }

    /// Scheduler configured from `config`.
    pub fn scheduler(&self) -> PhaseScheduler {
        PhaseScheduler::new(RoundSettings::from(&self.config), TeamAssigner::default())
    }

    /// Handle for the serving layer. Stays valid while `run` is executing.
    pub fn handle(&self) -> RoundHandle {
        RoundHandle::new(self.store.clone())
    }
}
