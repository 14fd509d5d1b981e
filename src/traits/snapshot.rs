use async_trait::async_trait;

use crate::error::SnapshotError;

/// Source of current holder addresses for the tracked asset.
///
/// Implementations return unique addresses with a positive balance, in a
/// stable order. Failures are reported as `SnapshotError` and never panic;
/// the scheduler decides the fallback.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable source name for logging.
    fn name(&self) -> &'static str;

    /// Fetch the current holder set for `token_address`.
    async fn fetch(&self, token_address: &str) -> Result<Vec<String>, SnapshotError>;
}
