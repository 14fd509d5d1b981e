pub mod mock;
pub mod noop;
pub mod variant;

pub use mock::MockFeeCollector;
pub use noop::NoopFeeCollector;
pub use variant::FeeCollectorVariant;
