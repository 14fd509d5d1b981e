//! Async task orchestration with tokio::spawn - the business logic lives in the
//! "*_once" functions below so it can be driven directly from tests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use kanal::{unbounded_async, AsyncSender};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::error::FeeCollectError;
use crate::scheduler::{PhaseScheduler, PreparedHolders, TickOutcome, Transition};
use crate::traits::{FeeCollector, SnapshotSource};
use crate::types::{ArenaDocument, FeeReceipt, Lamports, WinnerReply};

use super::core::{RoundSmith, SharedStore};

/// Load, run `f`, save. The store lock is held for the whole sequence.
pub async fn mutate_once<T, F>(store: &SharedStore, now: DateTime<Utc>, f: F) -> Result<T>
where
    F: FnOnce(&mut ArenaDocument) -> T,
{
    let store = store.lock().await;
    let mut doc = store.load(now)?;
    let out = f(&mut doc);
    store.save(&doc)?;
    Ok(out)
}

/// Load and project. Still takes the lock, since a first load may bootstrap.
pub async fn read_once<T, F>(store: &SharedStore, now: DateTime<Utc>, f: F) -> Result<T>
where
    F: FnOnce(&ArenaDocument) -> T,
{
    let store = store.lock().await;
    let doc = store.load(now)?;
    Ok(f(&doc))
}

/// One scheduler tick at `now`. Saves only when something changed.
///
/// The snapshot fetch for BREAK -> PRE_SNAPSHOT runs with the store unlocked.
/// The prepared teams are applied after re-loading, and only if the document
/// still waits for that round; otherwise they are dropped and the next tick
/// fetches again.
pub async fn tick_once<S>(
    store: &SharedStore,
    scheduler: &PhaseScheduler,
    snapshot: &S,
    now: DateTime<Utc>,
) -> Result<TickOutcome>
where
    S: SnapshotSource + ?Sized,
{
    let mut outcome = advance_once(store, scheduler, None, now).await?;
    let Some(next_round) = outcome.snapshot_due else {
        return Ok(outcome);
    };

    let prepared = scheduler.prepare_holders(snapshot, next_round, now).await;

    let applied = advance_once(store, scheduler, Some(&prepared), now).await?;
    if applied.snapshot_due.is_some() {
        debug!("Document moved on during snapshot, dropping teams for round {}", next_round);
    }
    outcome.absorb(applied);
    Ok(outcome)
}

async fn advance_once(
    store: &SharedStore,
    scheduler: &PhaseScheduler,
    prepared: Option<&PreparedHolders>,
    now: DateTime<Utc>,
) -> Result<TickOutcome> {
    let store = store.lock().await;
    let mut doc = store.load(now)?;

    let outcome = scheduler.advance(&mut doc, prepared, now);
    if outcome.changed() {
        store.save(&doc)?;
    }
    Ok(outcome)
}

/// Apply an externally reported winner.
///
/// Rejections never touch the store. If saving an accepted report fails the
/// acceptance is still returned, but it is not durable and is logged as such.
pub async fn report_winner_once(
    store: &SharedStore,
    round: u64,
    team: &str,
    now: DateTime<Utc>,
) -> Result<WinnerReply> {
    let store = store.lock().await;
    let mut doc = store.load(now)?;

    if let Err(reason) = PhaseScheduler::report_winner(&mut doc, round, team) {
        debug!("Winner report rejected (round={}, team={}): {}", round, team, reason);
        return Ok(WinnerReply::rejected(reason));
    }

    info!(
        "Round {} won by {} (prize {} lamports)",
        round, team, doc.state.prize_pool_lamports
    );
    if let Err(e) = store.save(&doc) {
        error!("Winner for round {} accepted but not persisted: {}", round, e);
    }
    Ok(WinnerReply::accepted())
}

/// Ask the collector for fees once and forward a positive receipt to the ledger writer.
pub async fn collect_fees_once<C>(
    collector: &C,
    ledger_tx: &AsyncSender<FeeReceipt>,
) -> Result<Option<FeeReceipt>>
where
    C: FeeCollector + ?Sized,
{
    match collector.collect().await {
        Ok(receipt) if receipt.lamports > 0 => {
            info!(
                "Collected {} lamports via {} (signature={:?})",
                receipt.lamports,
                collector.name(),
                receipt.signature
            );
            ledger_tx
                .send(receipt.clone())
                .await
                .map_err(|_| anyhow!("ledger channel closed"))?;
            Ok(Some(receipt))
        }
        Ok(_) => {
            debug!("No creator fees to collect via {}", collector.name());
            Ok(None)
        }
        Err(FeeCollectError::Disabled) => {
            debug!("Fee collector {} is disabled", collector.name());
            Ok(None)
        }
        Err(e) => {
            warn!("Fee collection via {} failed, deferring: {}", collector.name(), e);
            Ok(None)
        }
    }
}

/// Credit a fee receipt to the pending creator bucket. Returns the new pending total.
pub async fn ledger_write_once(
    store: &SharedStore,
    receipt: &FeeReceipt,
    now: DateTime<Utc>,
) -> Result<Lamports> {
    mutate_once(store, now, |doc| {
        doc.accumulate_creator_fee(receipt.lamports);
        doc.pending_creator_lamports
    })
    .await
}

fn log_outcome(outcome: &TickOutcome) {
    for transition in &outcome.transitions {
        match transition {
            Transition::BreakClockArmed { ends_at } => {
                info!("Break clock armed, ends at {}", ends_at.to_rfc3339())
            }
            Transition::PreSnapshot {
                next_round,
                holders,
                source,
            } => info!(
                "Phase PRE_SNAPSHOT: {} holders locked in for round {} ({:?})",
                holders, next_round, source
            ),
            Transition::Running { round } => info!("Phase RUNNING: round {}", round),
            Transition::TimedOut { round } => {
                warn!("Round {} timed out without a winner, phase ENDED", round)
            }
            Transition::Break { ends_at } => {
                info!("Phase BREAK until {}", ends_at.to_rfc3339())
            }
        }
    }
}

/// Tick forever. Errors are logged and the next tick proceeds.
async fn scheduler_loop<S>(
    store: SharedStore,
    scheduler: PhaseScheduler,
    snapshot: S,
    tick_interval: Duration,
) -> Result<()>
where
    S: SnapshotSource,
{
    info!("Scheduler task started (tick every {:?})", tick_interval);
    loop {
        match tick_once(&store, &scheduler, &snapshot, Utc::now()).await {
            Ok(outcome) => log_outcome(&outcome),
            Err(e) => error!("Error in scheduler tick: {}", e),
        }
        tokio::time::sleep(tick_interval).await;
    }
}

impl RoundSmith {
    /// Run the application: spawn the scheduler and fee tasks. The scheduler
    /// never returns under normal operation.
    pub async fn run(self) -> Result<()> {
        let scheduler = self.scheduler();
        let RoundSmith {
            snapshot,
            fee_collector,
            config,
            store,
        } = self;

        info!(
            "Starting RoundSmith with break_secs={}, tick_interval_ms={}, snapshot={}",
            config.break_secs,
            config.tick_interval_ms,
            snapshot.name()
        );

        let tick_interval = Duration::from_millis(config.tick_interval_ms.max(1));
        let (ledger_tx, ledger_rx) = unbounded_async::<FeeReceipt>();

        // === Scheduler task: drive the round phase machine ===
        let scheduler_handle = {
            let store = Arc::clone(&store);
            tokio::spawn(
                scheduler_loop(store, scheduler, snapshot, tick_interval)
                    .instrument(info_span!("scheduler_task")),
            )
        };

        // === Fee collector task: periodically collect creator fees ===
        let fee_handle = {
            let interval = config.fee_collect_interval_secs;
            tokio::spawn(
                async move {
                    let Some(secs) = interval else {
                        info!("Fee collection disabled");
                        return Ok::<(), anyhow::Error>(());
                    };
                    info!(
                        "Fee collector task started (collector={}, every {}s)",
                        fee_collector.name(),
                        secs
                    );

                    loop {
                        tokio::time::sleep(Duration::from_secs(secs.max(1))).await;
                        if let Err(e) = collect_fees_once(&fee_collector, &ledger_tx).await {
                            error!("Fee collector stopped: {}", e);
                            return Err(e);
                        }
                    }
                }
                .instrument(info_span!("fee_collector_task")),
            )
        };

        // === Ledger writer: credit collected fees through the store lock ===
        let ledger_handle = {
            let store = Arc::clone(&store);
            tokio::spawn(
                async move {
                    while let Ok(receipt) = ledger_rx.recv().await {
                        match ledger_write_once(&store, &receipt, Utc::now()).await {
                            Ok(pending) => debug!("Pending creator fees now {} lamports", pending),
                            Err(e) => error!("Failed to record creator fee: {}", e),
                        }
                    }
                    info!("Ledger writer finished (channel closed)");
                    Ok::<(), anyhow::Error>(())
                }
                .instrument(info_span!("ledger_write_task")),
            )
        };

        let (scheduler_res, fee_res, ledger_res) =
            tokio::join!(scheduler_handle, fee_handle, ledger_handle);

        scheduler_res??;
        fee_res??;
        ledger_res??;

        info!("RoundSmith run completed");
        Ok(())
    }
}
