// Library exports for testing and external use

pub mod config;
pub mod error;
pub mod fees;
pub mod history;
pub mod ledger;
pub mod roundsmith;
pub mod scheduler;
pub mod snapshot;
pub mod storage;
pub mod teams;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use config::{BaseConfig, FeeCollectorType, SnapshotSourceType};
pub use error::{FeeCollectError, RejectReason, SnapshotError};
pub use roundsmith::{RoundHandle, RoundSmith};
pub use scheduler::{PhaseScheduler, RoundSettings, TickOutcome, Transition};
pub use storage::StateStore;
pub use teams::{TeamAssigner, TeamAssignment};
pub use traits::{FeeCollector, SnapshotSource};
pub use types::{
    ArenaDocument, FeeReceipt, HistoryItem, Holder, HoldersSnapshot, Lamports, LedgerBalances,
    Phase, RoundState, RoundView, Team, WinnerReply,
};

// Re-export variant enums for convenience
pub use fees::{FeeCollectorVariant, MockFeeCollector};
pub use snapshot::{MockSnapshot, SnapshotVariant};
