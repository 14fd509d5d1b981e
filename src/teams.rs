//! Deterministic split of holder addresses into the four teams.
//!
//! The shuffle is a Fisher-Yates pass driven by ChaCha8 seeded with
//! `seed_from_u64(seed)`: for `i` from `len - 1` down to `1`, draw `next_u64()`
//! and swap `i` with `draw % (i + 1)`. ChaCha8's output stream is value-stable
//! across platforms and crate versions, so a given `(addresses, seed)` pair
//! reproduces the same teams on every run. Changing any step of this
//! procedure changes every future assignment.

use std::collections::BTreeMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SEED_MULTIPLIER;
use crate::types::{Holder, Team};

/// Teams in assignment order.
pub const TEAMS: [Team; 4] = Team::ALL;

/// Result of assigning one address list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAssignment {
    /// Holders in shuffled order; `items[i].team == TEAMS[i % 4]`.
    pub items: Vec<Holder>,
}

impl TeamAssignment {
    /// Members of one team, in shuffled order.
    pub fn members(&self, team: Team) -> Vec<&str> {
        self.items
            .iter()
            .filter(|h| h.team == team)
            .map(|h| h.address.as_str())
            .collect()
    }

    /// Team -> members mapping. Every team is present, possibly empty.
    pub fn by_team(&self) -> BTreeMap<Team, Vec<String>> {
        let mut teams: BTreeMap<Team, Vec<String>> =
            TEAMS.iter().map(|t| (*t, Vec::new())).collect();
        for holder in &self.items {
            teams
                .entry(holder.team)
                .or_default()
                .push(holder.address.clone());
        }
        teams
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_holders(self) -> Vec<Holder> {
        self.items
    }
}

/// Shuffle `items` in place, keyed only by `seed`.
pub fn seeded_shuffle<T>(items: &mut [T], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for i in (1..items.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

/// Splits addresses into teams. Holds the seed multiplier used per round.
#[derive(Debug, Clone, Copy)]
pub struct TeamAssigner {
    seed_multiplier: u64,
}

impl Default for TeamAssigner {
    fn default() -> Self {
        Self::new(SEED_MULTIPLIER)
    }
}

impl TeamAssigner {
    pub fn new(seed_multiplier: u64) -> Self {
        Self { seed_multiplier }
    }

    /// Seed used for the assignment of `round`.
    pub fn seed_for_round(&self, round: u64) -> u64 {
        round.wrapping_mul(self.seed_multiplier)
    }

    /// Assign with an explicit seed. Duplicates are kept as separate entries.
    pub fn assign(&self, addresses: &[String], seed: u64) -> TeamAssignment {
        let mut shuffled = addresses.to_vec();
        seeded_shuffle(&mut shuffled, seed);

        let items = shuffled
            .into_iter()
            .enumerate()
            .map(|(i, address)| Holder {
                address,
                team: TEAMS[i % TEAMS.len()],
            })
            .collect();

        TeamAssignment { items }
    }

    pub fn assign_round(&self, addresses: &[String], round: u64) -> TeamAssignment {
        self.assign(addresses, self.seed_for_round(round))
    }
}
