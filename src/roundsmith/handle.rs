use anyhow::Result;
use chrono::Utc;

use crate::scheduler::seconds_left;
use crate::types::{HistoryItem, HoldersSnapshot, Lamports, LedgerBalances, RoundView, WinnerReply};

use super::core::SharedStore;
use super::tasks;

/// Cloneable interface for the serving layer.
///
/// Every call goes through the same store lock as the scheduler tick.
#[derive(Clone)]
pub struct RoundHandle {
    store: SharedStore,
}

impl RoundHandle {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Current round state with `secondsLeft` for countdown phases.
    pub async fn state(&self) -> Result<RoundView> {
        let now = Utc::now();
        tasks::read_once(&self.store, now, |doc| {
            RoundView::new(&doc.state, seconds_left(&doc.state, now))
        })
        .await
    }

    pub async fn holders(&self) -> Result<HoldersSnapshot> {
        tasks::read_once(&self.store, Utc::now(), |doc| doc.holders.clone()).await
    }

    /// Full history, newest first.
    pub async fn history(&self) -> Result<Vec<HistoryItem>> {
        tasks::read_once(&self.store, Utc::now(), |doc| doc.history.clone()).await
    }

    pub async fn history_page(&self, offset: usize, limit: usize) -> Result<Vec<HistoryItem>> {
        tasks::read_once(&self.store, Utc::now(), |doc| {
            doc.history_page(offset, limit).to_vec()
        })
        .await
    }

    pub async fn report_winner(&self, round: u64, team: &str) -> Result<WinnerReply> {
        tasks::report_winner_once(&self.store, round, team, Utc::now()).await
    }

    pub async fn ledger(&self) -> Result<LedgerBalances> {
        tasks::read_once(&self.store, Utc::now(), |doc| doc.ledger_balances()).await
    }

    pub async fn accumulate_creator_fee(&self, lamports: Lamports) -> Result<()> {
        tasks::mutate_once(&self.store, Utc::now(), |doc| {
            doc.accumulate_creator_fee(lamports)
        })
        .await
    }

    pub async fn consume_pending_creator_fees(&self) -> Result<Lamports> {
        tasks::mutate_once(&self.store, Utc::now(), |doc| {
            doc.consume_pending_creator_fees()
        })
        .await
    }

    pub async fn add_to_prize_pool(&self, lamports: Lamports) -> Result<()> {
        tasks::mutate_once(&self.store, Utc::now(), |doc| doc.add_to_prize_pool(lamports)).await
    }

    pub async fn add_to_treasury(&self, lamports: Lamports) -> Result<()> {
        tasks::mutate_once(&self.store, Utc::now(), |doc| doc.add_to_treasury(lamports)).await
    }
}
