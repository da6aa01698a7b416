//! Guess ledgers.
//!
//! A ledger is one side's record of its own guesses. It is append-only:
//! an entry, once recorded, is never overwritten or removed, so the hit
//! count can only grow.
//!
//! Backed by `im::OrdMap` so a match snapshot clones in O(1).

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::coord::Coord;
use super::placement::BOTTLES_PER_SIDE;
use crate::error::MatchError;

/// Outcome of a single guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Hit,
    Miss,
}

impl Outcome {
    /// Outcome for a membership test against the hidden targets.
    #[must_use]
    pub fn of(hit: bool) -> Self {
        if hit {
            Outcome::Hit
        } else {
            Outcome::Miss
        }
    }

    #[must_use]
    pub fn is_hit(self) -> bool {
        self == Outcome::Hit
    }
}

/// Append-only `Coord -> Outcome` record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: OrdMap<Coord, Outcome>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a guess. Fails without mutation if `cell` is already present.
    pub fn record(&mut self, cell: Coord, outcome: Outcome) -> Result<(), MatchError> {
        if self.entries.contains_key(&cell) {
            return Err(MatchError::AlreadyGuessed(cell));
        }
        self.entries.insert(cell, outcome);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, cell: Coord) -> Option<Outcome> {
        self.entries.get(&cell).copied()
    }

    #[must_use]
    pub fn contains(&self, cell: Coord) -> bool {
        self.entries.contains_key(&cell)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `Hit` entries.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.entries.values().filter(|o| o.is_hit()).count()
    }

    /// True once every hidden target of the opponent has been hit.
    #[must_use]
    pub fn has_won(&self) -> bool {
        self.hits() >= BOTTLES_PER_SIDE
    }

    /// True if `other` contains every entry of `self` unchanged.
    ///
    /// Used to check that a remote ledger only ever grows.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Ledger) -> bool {
        self.entries
            .iter()
            .all(|(cell, outcome)| other.entries.get(cell) == Some(outcome))
    }

    /// Entries of `newer` that are not in `self`.
    pub fn new_entries<'a>(
        &'a self,
        newer: &'a Ledger,
    ) -> impl Iterator<Item = (Coord, Outcome)> + 'a {
        newer
            .entries
            .iter()
            .filter(move |(cell, _)| !self.entries.contains_key(*cell))
            .map(|(cell, outcome)| (*cell, *outcome))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, Outcome)> + '_ {
        self.entries.iter().map(|(cell, outcome)| (*cell, *outcome))
    }
}
