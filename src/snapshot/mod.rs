pub mod mock;
pub mod noop;
pub mod placeholder;
pub mod static_list;
pub mod variant;

pub use mock::MockSnapshot;
pub use noop::NoopSnapshot;
pub use placeholder::placeholder_addresses;
pub use static_list::StaticSnapshot;
pub use variant::SnapshotVariant;
