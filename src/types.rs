use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_BREAK_SECS;
use crate::error::{RejectReason, UnknownTeam};

/// Lamports are the smallest unit of the prize/fee currency.
pub type Lamports = u64;

/// One of the four fixed teams holders are split into.
///
/// Declaration order is the assignment order: the holder at shuffled index `i`
/// joins `Team::ALL[i % 4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Purple,
    Blue,
    Yellow,
}

impl Team {
    pub const ALL: [Team; 4] = [Team::Red, Team::Purple, Team::Blue, Team::Yellow];

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Purple => "purple",
            Team::Blue => "blue",
            Team::Yellow => "yellow",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = UnknownTeam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Team::ALL
            .into_iter()
            .find(|team| team.as_str() == s)
            .ok_or_else(|| UnknownTeam(s.to_string()))
    }
}

/// Round phase. Cycles BREAK -> PRE_SNAPSHOT -> RUNNING -> ENDED -> BREAK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Countdown before the next round's teams are locked in.
    Break,
    /// Last seconds of the countdown; holders are snapshotted and assigned.
    PreSnapshot,
    /// Live round, waiting for a winner report.
    Running,
    /// Winner recorded; the next tick returns to BREAK.
    Ended,
}

impl Phase {
    /// Phases that carry a `breakEndsAt` deadline.
    pub fn is_countdown(&self) -> bool {
        matches!(self, Phase::Break | Phase::PreSnapshot)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Break => "BREAK",
            Phase::PreSnapshot => "PRE_SNAPSHOT",
            Phase::Running => "RUNNING",
            Phase::Ended => "ENDED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub round_number: u64,
    pub phase: Phase,
    /// Set iff `phase` is BREAK or PRE_SNAPSHOT.
    #[serde(default)]
    pub break_ends_at: Option<DateTime<Utc>>,
    pub prize_pool_lamports: Lamports,
    #[serde(default)]
    pub winner: Option<Team>,
    /// Stamped on RUNNING entry; only consulted by the optional running timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_since: Option<DateTime<Utc>>,
}

/// One holder and the team it was assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    pub address: String,
    pub team: Team,
}

/// Holder snapshot for the upcoming/current round. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldersSnapshot {
    pub total: usize,
    pub token_address: String,
    #[serde(rename = "lastUpdatedISO")]
    pub last_updated: DateTime<Utc>,
    pub items: Vec<Holder>,
}

impl HoldersSnapshot {
    pub fn empty(token_address: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            total: 0,
            token_address: token_address.into(),
            last_updated: now,
            items: Vec::new(),
        }
    }
}

/// A settled round. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub round: u64,
    pub team: Team,
    pub prize_lamports: Lamports,
}

/// The whole persisted round/ledger document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaDocument {
    pub state: RoundState,
    pub holders: HoldersSnapshot,
    /// Newest first.
    #[serde(default)]
    pub history: Vec<HistoryItem>,
    #[serde(default)]
    pub pending_creator_lamports: Lamports,
    #[serde(default)]
    pub treasury_lamports: Lamports,
}

impl ArenaDocument {
    /// Fresh document: round 1 in BREAK, deadline `break_secs` from `now`.
    pub fn bootstrap(token_address: &str, break_secs: u64, now: DateTime<Utc>) -> Self {
        Self {
            state: RoundState {
                round_number: 1,
                phase: Phase::Break,
                break_ends_at: Some(break_deadline(now, break_secs)),
                prize_pool_lamports: 0,
                winner: None,
                running_since: None,
            },
            holders: HoldersSnapshot::empty(token_address, now),
            history: Vec::new(),
            pending_creator_lamports: 0,
            treasury_lamports: 0,
        }
    }
}

/// `now + break_secs`. A length that does not fit a timestamp falls back to
/// `DEFAULT_BREAK_SECS`.
pub fn break_deadline(now: DateTime<Utc>, break_secs: u64) -> DateTime<Utc> {
    i64::try_from(break_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|length| now.checked_add_signed(length))
        .unwrap_or_else(|| now + chrono::Duration::seconds(DEFAULT_BREAK_SECS as i64))
}

/// Public projection of the round state with the derived countdown.
/// Scheduler bookkeeping such as `runningSince` stays out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub round_number: u64,
    pub phase: Phase,
    pub break_ends_at: Option<DateTime<Utc>>,
    pub prize_pool_lamports: Lamports,
    pub winner: Option<Team>,
    /// Only present in BREAK and PRE_SNAPSHOT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_left: Option<u64>,
}

impl RoundView {
    pub fn new(state: &RoundState, seconds_left: Option<u64>) -> Self {
        Self {
            round_number: state.round_number,
            phase: state.phase,
            break_ends_at: state.break_ends_at,
            prize_pool_lamports: state.prize_pool_lamports,
            winner: state.winner,
            seconds_left,
        }
    }
}

/// Outcome of a winner report: `{ok: true}` or `{ok: false, reason}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinnerReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl WinnerReply {
    pub fn accepted() -> Self {
        Self { ok: true, reason: None }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
        }
    }
}

/// Snapshot of the document-level counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerBalances {
    pub prize_pool_lamports: Lamports,
    pub pending_creator_lamports: Lamports,
    pub treasury_lamports: Lamports,
}

/// Result of one successful fee collection by the external collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeReceipt {
    pub lamports: Lamports,
    /// Transaction identifier returned by the submission endpoint.
    pub signature: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_parse_and_display() {
        for team in Team::ALL {
            assert_eq!(team.as_str().parse::<Team>().unwrap(), team);
        }
        assert!("green".parse::<Team>().is_err());
        assert!("Red".parse::<Team>().is_err());
    }

    #[test]
    fn test_document_wire_names() {
        let now = Utc::now();
        let doc = ArenaDocument::bootstrap("Mint111", 30, now);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["state"]["roundNumber"], 1);
        assert_eq!(json["state"]["phase"], "BREAK");
        assert!(json["state"]["breakEndsAt"].is_string());
        assert!(json["state"].get("runningSince").is_none());
        assert_eq!(json["holders"]["tokenAddress"], "Mint111");
        assert!(json["holders"]["lastUpdatedISO"].is_string());
        assert_eq!(json["pendingCreatorLamports"], 0);
        assert_eq!(json["treasuryLamports"], 0);
    }

    #[test]
    fn test_pre_snapshot_serializes_screaming() {
        let json = serde_json::to_string(&Phase::PreSnapshot).unwrap();
        assert_eq!(json, "\"PRE_SNAPSHOT\"");
        assert_eq!(Phase::PreSnapshot.to_string(), "PRE_SNAPSHOT");
    }

    #[test]
    fn test_winner_reply_shape() {
        let ok = serde_json::to_value(WinnerReply::accepted()).unwrap();
        assert_eq!(ok, serde_json::json!({ "ok": true }));

        let rejected = serde_json::to_value(WinnerReply::rejected(RejectReason::BadTeam)).unwrap();
        assert_eq!(rejected, serde_json::json!({ "ok": false, "reason": "bad team" }));
    }

    #[test]
    fn test_round_view_hides_running_since() {
        let now = Utc::now();
        let mut state = ArenaDocument::bootstrap("Mint", 30, now).state;
        state.phase = Phase::Running;
        state.round_number = 3;
        state.break_ends_at = None;
        state.running_since = Some(now);

        let json = serde_json::to_value(RoundView::new(&state, None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "roundNumber": 3,
                "phase": "RUNNING",
                "breakEndsAt": null,
                "prizePoolLamports": 0,
                "winner": null,
            })
        );

        state.phase = Phase::Break;
        let json = serde_json::to_value(RoundView::new(&state, Some(12))).unwrap();
        assert_eq!(json["secondsLeft"], 12);
        assert!(json.get("runningSince").is_none());
    }

    #[test]
    fn test_break_deadline_never_overflows() {
        let now = DateTime::parse_from_rfc3339("2025-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let fallback = now + chrono::Duration::seconds(DEFAULT_BREAK_SECS as i64);

        assert_eq!(break_deadline(now, 45), now + chrono::Duration::seconds(45));
        assert_eq!(break_deadline(now, u64::MAX), fallback);
        assert_eq!(break_deadline(now, 1 << 62), fallback);
        assert_eq!(break_deadline(now, i64::MAX as u64), fallback);
    }
}
