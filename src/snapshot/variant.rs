use async_trait::async_trait;

use super::mock::MockSnapshot;
use super::noop::NoopSnapshot;
use super::static_list::StaticSnapshot;
use crate::config::{BaseConfig, SnapshotSourceType};
use crate::error::SnapshotError;
use crate::traits::SnapshotSource;

/// Enum representing all possible snapshot source implementations.
pub enum SnapshotVariant {
    Noop(NoopSnapshot),
    Static(StaticSnapshot),
    Mock(MockSnapshot),
}

impl SnapshotVariant {
    /// Build the source selected in `config`.
    pub fn from_config(config: &BaseConfig) -> Self {
        match config.snapshot_source {
            SnapshotSourceType::Noop => SnapshotVariant::Noop(NoopSnapshot),
            SnapshotSourceType::Static => {
                SnapshotVariant::Static(StaticSnapshot::new(config.static_holders.clone()))
            }
        }
    }
}

#[async_trait]
impl SnapshotSource for SnapshotVariant {
    fn name(&self) -> &'static str {
        match self {
            SnapshotVariant::Noop(inner) => inner.name(),
            SnapshotVariant::Static(inner) => inner.name(),
            SnapshotVariant::Mock(inner) => inner.name(),
        }
    }

    async fn fetch(&self, token_address: &str) -> Result<Vec<String>, SnapshotError> {
        match self {
            SnapshotVariant::Noop(inner) => inner.fetch(token_address).await,
            SnapshotVariant::Static(inner) => inner.fetch(token_address).await,
            SnapshotVariant::Mock(inner) => inner.fetch(token_address).await,
        }
    }
}
