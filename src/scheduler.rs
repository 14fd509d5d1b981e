//! Round phase state machine.
//!
//! `PhaseScheduler` mutates an `ArenaDocument` in memory; loading, saving and
//! serialization against concurrent writers happen in `roundsmith::tasks`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::BaseConfig;
use crate::error::{RejectReason, SnapshotError};
use crate::snapshot::placeholder_addresses;
use crate::teams::TeamAssigner;
use crate::traits::SnapshotSource;
use crate::types::{break_deadline, ArenaDocument, HistoryItem, HoldersSnapshot, Phase, RoundState, Team};

/// Scheduler settings, fixed at construction.
#[derive(Debug, Clone)]
pub struct RoundSettings {
    pub break_secs: u64,
    pub pre_snapshot_secs: u64,
    pub token_address: String,
    pub placeholder_holders: usize,
    pub snapshot_timeout: Duration,
    pub running_timeout: Option<Duration>,
}

impl From<&BaseConfig> for RoundSettings {
    fn from(config: &BaseConfig) -> Self {
        Self {
            break_secs: config.break_secs,
            pre_snapshot_secs: config.pre_snapshot_secs,
            token_address: config.token_address.clone(),
            placeholder_holders: config.placeholder_holders,
            snapshot_timeout: Duration::from_secs(config.snapshot_timeout_secs),
            running_timeout: config.running_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self::from(&BaseConfig::default())
    }
}

/// Where the holder list for a round came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderSource {
    Snapshot,
    /// Snapshot came back empty.
    PlaceholderEmpty,
    /// Snapshot failed.
    PlaceholderError(SnapshotError),
}

/// A single state change made during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A countdown phase had no deadline; one was set.
    BreakClockArmed { ends_at: DateTime<Utc> },
    /// BREAK -> PRE_SNAPSHOT with teams for `next_round` locked in.
    PreSnapshot {
        next_round: u64,
        holders: usize,
        source: HolderSource,
    },
    /// BREAK/PRE_SNAPSHOT -> RUNNING.
    Running { round: u64 },
    /// RUNNING -> ENDED without a winner, by the running timeout.
    TimedOut { round: u64 },
    /// ENDED -> BREAK.
    Break { ends_at: DateTime<Utc> },
}

/// What one tick did. No transitions means the document is unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub transitions: Vec<Transition>,
    /// Set when the tick stopped at BREAK -> PRE_SNAPSHOT waiting for holders
    /// of this round.
    pub snapshot_due: Option<u64>,
}

impl TickOutcome {
    pub fn changed(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Append the result of a follow-up step within the same tick.
    pub fn absorb(&mut self, next: TickOutcome) {
        self.transitions.extend(next.transitions);
        self.snapshot_due = next.snapshot_due;
    }
}

/// Teams for a round, computed outside the document lock and applied only if
/// the document still expects that round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedHolders {
    pub next_round: u64,
    pub holders: HoldersSnapshot,
    pub source: HolderSource,
}

/// Whole seconds until `breakEndsAt`, clamped at zero. `None` outside countdown phases.
pub fn seconds_left(state: &RoundState, now: DateTime<Utc>) -> Option<u64> {
    if !state.phase.is_countdown() {
        return None;
    }
    let ends_at = state.break_ends_at?;
    Some((ends_at - now).num_seconds().max(0) as u64)
}

pub struct PhaseScheduler {
    settings: RoundSettings,
    assigner: TeamAssigner,
}

impl PhaseScheduler {
    pub fn new(settings: RoundSettings, assigner: TeamAssigner) -> Self {
        Self { settings, assigner }
    }

    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    fn break_deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        break_deadline(now, self.settings.break_secs)
    }

    /// Advance `doc` by one tick at time `now`, fetching holders inline.
    ///
    /// Steps run in order within the same tick, so a countdown that is already
    /// at zero takes the snapshot and then enters RUNNING. `tasks::tick_once`
    /// runs the same two steps but releases the store between them.
    pub async fn tick<S>(&self, doc: &mut ArenaDocument, snapshot: &S, now: DateTime<Utc>) -> TickOutcome
    where
        S: SnapshotSource + ?Sized,
    {
        let mut outcome = self.advance(doc, None, now);
        if let Some(next_round) = outcome.snapshot_due {
            let prepared = self.prepare_holders(snapshot, next_round, now).await;
            outcome.absorb(self.advance(doc, Some(&prepared), now));
        }
        outcome
    }

    /// Apply every transition due at `now` that needs no I/O.
    ///
    /// When BREAK -> PRE_SNAPSHOT is due and `prepared` does not hold teams for
    /// the next round, the countdown stops here and `snapshot_due` names the
    /// round to fetch for.
    pub fn advance(
        &self,
        doc: &mut ArenaDocument,
        prepared: Option<&PreparedHolders>,
        now: DateTime<Utc>,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if doc.state.phase.is_countdown() && doc.state.break_ends_at.is_none() {
            let ends_at = self.break_deadline(now);
            doc.state.break_ends_at = Some(ends_at);
            outcome.transitions.push(Transition::BreakClockArmed { ends_at });
        }

        match doc.state.phase {
            Phase::Break | Phase::PreSnapshot => {
                let left = seconds_left(&doc.state, now).unwrap_or(0);

                if doc.state.phase == Phase::Break && left <= self.settings.pre_snapshot_secs {
                    let next_round = doc.state.round_number + 1;
                    match prepared.filter(|p| p.next_round == next_round) {
                        Some(prepared) => {
                            outcome.transitions.push(Self::enter_pre_snapshot(doc, prepared));
                        }
                        None => {
                            outcome.snapshot_due = Some(next_round);
                            return outcome;
                        }
                    }
                }

                if left == 0 {
                    doc.state.phase = Phase::Running;
                    doc.state.round_number += 1;
                    doc.state.break_ends_at = None;
                    doc.state.winner = None;
                    doc.state.running_since = Some(now);
                    outcome.transitions.push(Transition::Running {
                        round: doc.state.round_number,
                    });
                }
            }
            Phase::Running => {
                if self.running_expired(&doc.state, now) {
                    doc.state.phase = Phase::Ended;
                    doc.state.winner = None;
                    outcome.transitions.push(Transition::TimedOut {
                        round: doc.state.round_number,
                    });
                }
            }
            Phase::Ended => {
                let ends_at = self.break_deadline(now);
                doc.state.phase = Phase::Break;
                doc.state.break_ends_at = Some(ends_at);
                outcome.transitions.push(Transition::Break { ends_at });
            }
        }

        outcome
    }

    fn running_expired(&self, state: &RoundState, now: DateTime<Utc>) -> bool {
        let (Some(limit), Some(since)) = (self.settings.running_timeout, state.running_since) else {
            return false;
        };
        let elapsed = (now - since).num_seconds().max(0) as u64;
        elapsed >= limit.as_secs()
    }

    /// Fetch holders and assign teams for `next_round`. Never fails: an empty
    /// or failed snapshot is replaced by the placeholder set.
    pub async fn prepare_holders<S>(
        &self,
        snapshot: &S,
        next_round: u64,
        now: DateTime<Utc>,
    ) -> PreparedHolders
    where
        S: SnapshotSource + ?Sized,
    {
        let token = self.settings.token_address.as_str();
        let fetched = match tokio::time::timeout(self.settings.snapshot_timeout, snapshot.fetch(token)).await {
            Ok(result) => result,
            Err(_) => Err(SnapshotError::Timeout(self.settings.snapshot_timeout)),
        };

        let (addresses, source) = match fetched {
            Ok(addresses) if !addresses.is_empty() => (addresses, HolderSource::Snapshot),
            Ok(_) => {
                warn!(
                    "Snapshot from {} returned no holders, using {} placeholders",
                    snapshot.name(),
                    self.settings.placeholder_holders
                );
                (
                    placeholder_addresses(self.settings.placeholder_holders),
                    HolderSource::PlaceholderEmpty,
                )
            }
            Err(e) => {
                warn!(
                    "Snapshot from {} failed ({}), using {} placeholders",
                    snapshot.name(),
                    e,
                    self.settings.placeholder_holders
                );
                (
                    placeholder_addresses(self.settings.placeholder_holders),
                    HolderSource::PlaceholderError(e),
                )
            }
        };

        let assignment = self.assigner.assign_round(&addresses, next_round);
        debug!(
            "Assigned {} holders for round {} (seed={})",
            assignment.len(),
            next_round,
            self.assigner.seed_for_round(next_round)
        );

        let items = assignment.into_holders();
        PreparedHolders {
            next_round,
            holders: HoldersSnapshot {
                total: items.len(),
                token_address: self.settings.token_address.clone(),
                last_updated: now,
                items,
            },
            source,
        }
    }

    fn enter_pre_snapshot(doc: &mut ArenaDocument, prepared: &PreparedHolders) -> Transition {
        doc.state.phase = Phase::PreSnapshot;
        doc.holders = prepared.holders.clone();

        Transition::PreSnapshot {
            next_round: prepared.next_round,
            holders: prepared.holders.total,
            source: prepared.source.clone(),
        }
    }

    /// Apply a winner report. Preconditions are checked in order and a
    /// rejection leaves `doc` untouched.
    pub fn report_winner(doc: &mut ArenaDocument, round: u64, team: &str) -> Result<(), RejectReason> {
        if doc.state.phase != Phase::Running {
            return Err(RejectReason::NotRunning);
        }
        let team: Team = team.parse().map_err(|_| RejectReason::BadTeam)?;
        if round != doc.state.round_number {
            return Err(RejectReason::RoundMismatch);
        }

        doc.state.winner = Some(team);
        doc.state.phase = Phase::Ended;
        doc.record_history(HistoryItem {
            round,
            team,
            prize_lamports: doc.state.prize_pool_lamports,
        });
        Ok(())
    }
}
