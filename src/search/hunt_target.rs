//! Hunt-target search.
//!
//! Two sub-strategies:
//!
//! - **Target**: after a hit, the on-grid untried neighbors of that cell are
//!   shuffled and queued. Queued cells are tried first.
//! - **Hunt**: with nothing queued, pick uniformly among untried cells,
//!   preferring even linear indices. Targets are one cell wide, so the
//!   parity filter never hides a target for good; it only orders the search.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::core::{Coord, GameRng, CELL_COUNT};

use super::strategy::TargetStrategy;

/// Stateful hunt-target opponent.
#[derive(Clone, Debug)]
pub struct HuntTarget {
    /// Cells to try next, front first. May hold duplicates or stale entries.
    pending: VecDeque<Coord>,
    /// Every cell already guessed. Only grows until `reset`.
    tried: FxHashSet<Coord>,
    rng: GameRng,
}

impl HuntTarget {
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self {
            pending: VecDeque::new(),
            tried: FxHashSet::default(),
            rng,
        }
    }

    /// Cells already guessed.
    #[must_use]
    pub fn tried(&self) -> &FxHashSet<Coord> {
        &self.tried
    }

    /// Queued follow-up cells, including stale ones.
    pub fn pending(&self) -> impl Iterator<Item = Coord> + '_ {
        self.pending.iter().copied()
    }

    /// Pop queued cells until one is still untried.
    fn next_target(&mut self) -> Option<Coord> {
        while let Some(candidate) = self.pending.pop_front() {
            if !self.tried.contains(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn next_hunt(&mut self) -> Option<Coord> {
        let untried: Vec<Coord> = Coord::all().filter(|c| !self.tried.contains(c)).collect();
        let even: Vec<Coord> = untried.iter().copied().filter(|c| c.index() % 2 == 0).collect();

        let pool = if even.is_empty() { &untried } else { &even };
        self.rng.choose(pool).copied()
    }
}

impl TargetStrategy for HuntTarget {
    fn next_guess(&mut self) -> Option<Coord> {
        if let Some(target) = self.next_target() {
            log::trace!("hunt-target: following up at {target}");
            return Some(target);
        }

        let pick = self.next_hunt();
        if pick.is_none() {
            debug_assert_eq!(self.tried.len(), CELL_COUNT);
            log::warn!("hunt-target: every cell tried, no move available");
        }
        pick
    }

    fn register_result(&mut self, cell: Coord, hit: bool) {
        self.tried.insert(cell);
        if !hit {
            return;
        }

        let mut follow_ups: Vec<Coord> = cell
            .neighbors()
            .into_iter()
            .filter(|n| !self.tried.contains(n))
            .collect();
        self.rng.shuffle(&mut follow_ups);
        self.pending.extend(follow_ups);
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.tried.clear();
    }
}
