use async_trait::async_trait;

use super::mock::MockFeeCollector;
use super::noop::NoopFeeCollector;
use crate::config::{BaseConfig, FeeCollectorType};
use crate::error::FeeCollectError;
use crate::traits::FeeCollector;
use crate::types::FeeReceipt;

/// Enum representing all possible fee collector implementations.
pub enum FeeCollectorVariant {
    Noop(NoopFeeCollector),
    Mock(MockFeeCollector),
}

impl FeeCollectorVariant {
    pub fn from_config(config: &BaseConfig) -> Self {
        match config.fee_collector {
            FeeCollectorType::Noop => FeeCollectorVariant::Noop(NoopFeeCollector),
        }
    }
}

#[async_trait]
impl FeeCollector for FeeCollectorVariant {
    fn name(&self) -> &'static str {
        match self {
            FeeCollectorVariant::Noop(inner) => inner.name(),
            FeeCollectorVariant::Mock(inner) => inner.name(),
        }
    }

    async fn collect(&self) -> Result<FeeReceipt, FeeCollectError> {
        match self {
            FeeCollectorVariant::Noop(inner) => inner.collect().await,
            FeeCollectorVariant::Mock(inner) => inner.collect().await,
        }
    }
}
