use async_trait::async_trait;

use crate::error::FeeCollectError;
use crate::traits::FeeCollector;
use crate::types::FeeReceipt;

/// Fee collector used when no custodial wallet is configured.
pub struct NoopFeeCollector;

#[async_trait]
impl FeeCollector for NoopFeeCollector {
    fn name(&self) -> &'static str {
        "noop-fee-collector"
    }

    async fn collect(&self) -> Result<FeeReceipt, FeeCollectError> {
        Err(FeeCollectError::Disabled)
    }
}
