use async_trait::async_trait;

use crate::error::FeeCollectError;
use crate::types::FeeReceipt;

/// External utility that builds, signs and submits a fee-collection
/// transaction on behalf of the creator wallet.
///
/// A successful receipt is fed into the pending creator fee bucket.
#[async_trait]
pub trait FeeCollector: Send + Sync {
    /// Human-readable collector name for logging.
    fn name(&self) -> &'static str;

    /// Collect whatever fees are claimable right now.
    async fn collect(&self) -> Result<FeeReceipt, FeeCollectError>;
}
