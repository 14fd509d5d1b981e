use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::SnapshotError;
use crate::traits::SnapshotSource;

/// Snapshot source serving a fixed, configured address list.
pub struct StaticSnapshot {
    addresses: Vec<String>,
}

impl StaticSnapshot {
    /// Blank entries are dropped and duplicates collapse to their first occurrence.
    pub fn new(addresses: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let addresses = addresses
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty() && seen.insert(a.clone()))
            .collect();
        Self { addresses }
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }
}

#[async_trait]
impl SnapshotSource for StaticSnapshot {
    fn name(&self) -> &'static str {
        "static-snapshot"
    }

    async fn fetch(&self, _token_address: &str) -> Result<Vec<String>, SnapshotError> {
        Ok(self.addresses.clone())
    }
}
