use async_trait::async_trait;

use crate::error::SnapshotError;
use crate::traits::SnapshotSource;

/// Snapshot source with no backing ledger; always reports no holders.
pub struct NoopSnapshot;

#[async_trait]
impl SnapshotSource for NoopSnapshot {
    fn name(&self) -> &'static str {
        "noop-snapshot"
    }

    async fn fetch(&self, token_address: &str) -> Result<Vec<String>, SnapshotError> {
        tracing::debug!("NoopSnapshot: fetch({}) - no holders", token_address);
        Ok(Vec::new())
    }
}
