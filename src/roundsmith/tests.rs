//! Unit tests for RoundSmith task functions.
//!
//! These drive the "*_once" functions directly with explicit timestamps,
//! without spawning the scheduler loop.

use std::sync::Arc;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanal::unbounded_async;
use tokio::sync::Notify;

use super::core::SharedStore;
use super::tasks;
use crate::error::{FeeCollectError, RejectReason, SnapshotError};
use crate::fees::MockFeeCollector;
use crate::scheduler::{PhaseScheduler, RoundSettings, Transition};
use crate::snapshot::MockSnapshot;
use crate::traits::SnapshotSource;
use crate::storage::{Bootstrap, StateStore};
use crate::teams::TeamAssigner;
use crate::types::{FeeReceipt, Phase, WinnerReply};

// ==================== TEST HELPERS ====================

fn test_t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn at(secs: i64) -> DateTime<Utc> {
    test_t0() + chrono::Duration::seconds(secs)
}

fn open_store(dir: &tempfile::TempDir) -> Result<SharedStore> {
    let store = StateStore::open(dir.path().to_str().unwrap(), Bootstrap::default())?;
    Ok(Arc::new(tokio::sync::Mutex::new(store)))
}

fn scheduler() -> PhaseScheduler {
    PhaseScheduler::new(RoundSettings::default(), TeamAssigner::default())
}

/// Snapshot source that blocks inside `fetch` until released.
#[derive(Default)]
struct GatedSnapshot {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl SnapshotSource for GatedSnapshot {
    fn name(&self) -> &'static str {
        "gated-snapshot"
    }

    async fn fetch(&self, _token_address: &str) -> Result<Vec<String>, SnapshotError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(vec!["late1".into(), "late2".into()])
    }
}

// ==================== TESTS: tick_once ====================

#[tokio::test]
async fn test_tick_once_persists_only_on_change() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = open_store(&temp_dir)?;
    let source = MockSnapshot::default();

    let outcome = tasks::tick_once(&store, &scheduler(), &source, at(0)).await?;
    assert!(!outcome.changed());

    let outcome = tasks::tick_once(&store, &scheduler(), &source, at(26)).await?;
    assert!(matches!(outcome.transitions[0], Transition::PreSnapshot { next_round: 2, .. }));

    let doc = store.lock().await.load(at(27))?;
    assert_eq!(doc.state.phase, Phase::PreSnapshot);
    assert_eq!(doc.holders.total, 80);

    Ok(())
}

#[tokio::test]
async fn test_full_round_cycle() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = open_store(&temp_dir)?;
    let source = MockSnapshot::new(vec!["h1".into(), "h2".into(), "h3".into(), "h4".into()]);
    let scheduler = scheduler();
    store.lock().await.load(at(0))?;

    for s in 1..=30 {
        tasks::tick_once(&store, &scheduler, &source, at(s)).await?;
    }
    assert_eq!(source.calls(), 1, "snapshot is taken once per round");

    let doc = store.lock().await.load(at(30))?;
    assert_eq!(doc.state.phase, Phase::Running);
    assert_eq!(doc.state.round_number, 2);

    let reply = tasks::report_winner_once(&store, 2, "yellow", at(40)).await?;
    assert_eq!(reply, WinnerReply::accepted());

    let outcome = tasks::tick_once(&store, &scheduler, &source, at(41)).await?;
    assert!(matches!(outcome.transitions[0], Transition::Break { .. }));

    let doc = store.lock().await.load(at(41))?;
    assert_eq!(doc.state.phase, Phase::Break);
    assert_eq!(doc.state.round_number, 2);
    assert_eq!(doc.state.break_ends_at, Some(at(71)));
    assert_eq!(doc.history.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_store_stays_available_during_snapshot_fetch() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = open_store(&temp_dir)?;
    store.lock().await.load(at(0))?;
    let source = Arc::new(GatedSnapshot::default());

    let tick = {
        let store = Arc::clone(&store);
        let source = Arc::clone(&source);
        tokio::spawn(async move { tasks::tick_once(&store, &scheduler(), &*source, at(26)).await })
    };
    source.started.notified().await;

    // Reads and ledger writes go through while the fetch is outstanding.
    let phase = tokio::time::timeout(
        Duration::from_secs(1),
        tasks::read_once(&store, at(26), |doc| doc.state.phase),
    )
    .await??;
    assert_eq!(phase, Phase::Break);
    tokio::time::timeout(
        Duration::from_secs(1),
        tasks::mutate_once(&store, at(26), |doc| doc.add_to_prize_pool(70)),
    )
    .await??;

    source.release.notify_one();
    let outcome = tick.await??;
    assert!(matches!(outcome.transitions[0], Transition::PreSnapshot { next_round: 2, holders: 2, .. }));

    let doc = store.lock().await.load(at(27))?;
    assert_eq!(doc.state.phase, Phase::PreSnapshot);
    assert_eq!(doc.holders.total, 2);
    assert_eq!(doc.state.prize_pool_lamports, 70);

    Ok(())
}

#[tokio::test]
async fn test_teams_dropped_when_round_moves_during_fetch() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = open_store(&temp_dir)?;
    store.lock().await.load(at(0))?;
    let source = Arc::new(GatedSnapshot::default());

    let tick = {
        let store = Arc::clone(&store);
        let source = Arc::clone(&source);
        tokio::spawn(async move { tasks::tick_once(&store, &scheduler(), &*source, at(26)).await })
    };
    source.started.notified().await;

    tasks::mutate_once(&store, at(26), |doc| {
        doc.state.phase = Phase::Running;
        doc.state.round_number = 2;
        doc.state.break_ends_at = None;
    })
    .await?;

    source.release.notify_one();
    let outcome = tick.await??;
    assert!(!outcome.changed());

    let doc = store.lock().await.load(at(27))?;
    assert_eq!(doc.state.phase, Phase::Running);
    assert_eq!(doc.holders.total, 0, "stale teams are not applied");

    Ok(())
}

// ==================== TESTS: report_winner_once ====================

#[tokio::test]
async fn test_report_winner_once_rejects_during_break() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = open_store(&temp_dir)?;

    let before = store.lock().await.load(at(0))?;
    let reply = tasks::report_winner_once(&store, 1, "red", at(1)).await?;

    assert_eq!(reply, WinnerReply::rejected(RejectReason::NotRunning));
    assert_eq!(store.lock().await.load(at(2))?, before);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_reports_accept_exactly_one() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = open_store(&temp_dir)?;
    {
        let guard = store.lock().await;
        let mut doc = guard.load(at(0))?;
        doc.state.phase = Phase::Running;
        doc.state.break_ends_at = None;
        guard.save(&doc)?;
    }

    let mut handles = Vec::new();
    for team in ["red", "purple", "blue", "yellow"] {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            tasks::report_winner_once(&store, 1, team, at(5)).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await??.ok {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);

    let doc = store.lock().await.load(at(6))?;
    assert_eq!(doc.history.len(), 1);
    assert_eq!(Some(doc.history[0].team), doc.state.winner);

    Ok(())
}

// ==================== TESTS: fees ====================

#[tokio::test]
async fn test_collect_fees_once_forwards_positive_receipts() -> Result<()> {
    let collector = MockFeeCollector::new(vec![
        Ok(FeeReceipt {
            lamports: 1_500,
            signature: Some("sig1".into()),
        }),
        Ok(FeeReceipt {
            lamports: 0,
            signature: None,
        }),
        Err(FeeCollectError::Submission("blockhash expired".into())),
    ]);
    let (tx, rx) = unbounded_async::<FeeReceipt>();

    let first = tasks::collect_fees_once(&collector, &tx).await?;
    assert_eq!(first.map(|r| r.lamports), Some(1_500));
    assert!(tasks::collect_fees_once(&collector, &tx).await?.is_none());
    assert!(tasks::collect_fees_once(&collector, &tx).await?.is_none());
    assert!(tasks::collect_fees_once(&collector, &tx).await?.is_none());
    assert_eq!(collector.calls(), 4);

    let forwarded = rx.recv().await?;
    assert_eq!(forwarded.lamports, 1_500);
    assert_eq!(rx.len(), 0, "only one receipt forwarded");

    Ok(())
}

#[tokio::test]
async fn test_ledger_write_once_accumulates() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = open_store(&temp_dir)?;
    let receipt = FeeReceipt {
        lamports: 400,
        signature: None,
    };

    assert_eq!(tasks::ledger_write_once(&store, &receipt, at(0)).await?, 400);
    assert_eq!(tasks::ledger_write_once(&store, &receipt, at(1)).await?, 800);

    let consumed = tasks::mutate_once(&store, at(2), |doc| doc.consume_pending_creator_fees()).await?;
    assert_eq!(consumed, 800);
    assert_eq!(store.lock().await.load(at(3))?.pending_creator_lamports, 0);

    Ok(())
}
