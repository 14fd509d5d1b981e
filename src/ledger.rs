//! Prize pool, pending creator fees and treasury counters.
//!
//! Creator fees are accumulated and can be consumed (read and zeroed). Splitting a
//! consumed amount between prize pool and treasury is left to the caller.

use crate::types::{ArenaDocument, Lamports, LedgerBalances};

impl ArenaDocument {
    /// Add a collected creator fee to the pending bucket.
    pub fn accumulate_creator_fee(&mut self, lamports: Lamports) {
        self.pending_creator_lamports = self.pending_creator_lamports.saturating_add(lamports);
    }

    /// Return the pending creator fees and reset the bucket to zero.
    pub fn consume_pending_creator_fees(&mut self) -> Lamports {
        std::mem::take(&mut self.pending_creator_lamports)
    }

    pub fn add_to_prize_pool(&mut self, lamports: Lamports) {
        self.state.prize_pool_lamports = self.state.prize_pool_lamports.saturating_add(lamports);
    }

    pub fn add_to_treasury(&mut self, lamports: Lamports) {
        self.treasury_lamports = self.treasury_lamports.saturating_add(lamports);
    }

    pub fn ledger_balances(&self) -> LedgerBalances {
        LedgerBalances {
            prize_pool_lamports: self.state.prize_pool_lamports,
            pending_creator_lamports: self.pending_creator_lamports,
            treasury_lamports: self.treasury_lamports,
        }
    }
}
