pub mod fee_collector;
pub mod snapshot;

pub use fee_collector::FeeCollector;
pub use snapshot::SnapshotSource;
