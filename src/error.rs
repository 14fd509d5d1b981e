use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a winner report was rejected. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("not running")]
    NotRunning,

    #[error("bad team")]
    BadTeam,

    #[error("round mismatch")]
    RoundMismatch,
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown team `{0}`")]
pub struct UnknownTeam(pub String);

/// Failure of a holder snapshot fetch. Never fatal to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot transport failed: {0}")]
    Transport(String),

    #[error("snapshot response unparseable: {0}")]
    Parse(String),

    #[error("snapshot timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of the external fee-collection utility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeCollectError {
    #[error("fee collection disabled")]
    Disabled,

    #[error("fee collection transport failed: {0}")]
    Transport(String),

    #[error("fee collection signing failed: {0}")]
    Signing(String),

    #[error("fee collection submission failed: {0}")]
    Submission(String),
}
