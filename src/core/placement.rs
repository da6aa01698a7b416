//! A side's hidden targets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::coord::Coord;
use super::rng::GameRng;
use crate::error::MatchError;

/// Number of targets each side hides.
pub const BOTTLES_PER_SIDE: usize = 4;

/// A set of at most 4 distinct coordinates owned by one side.
///
/// Size stays in `0..=4` while editing; only a complete placement
/// (exactly 4) can be locked in for guessing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Placement {
    cells: BTreeSet<Coord>,
}

/// What a toggle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementChange {
    Added(Coord),
    Removed(Coord),
}

impl Placement {
    /// Create an empty placement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a placement from coordinates, rejecting duplicates and overflow.
    pub fn from_cells(cells: impl IntoIterator<Item = Coord>) -> Result<Self, MatchError> {
        let mut placement = Self::new();
        for cell in cells {
            placement.insert(cell)?;
        }
        Ok(placement)
    }

    /// Pick 4 distinct cells uniformly at random.
    pub fn random(rng: &mut GameRng) -> Self {
        let mut all: Vec<Coord> = Coord::all().collect();
        rng.shuffle(&mut all);
        Self {
            cells: all.into_iter().take(BOTTLES_PER_SIDE).collect(),
        }
    }

    /// Add a cell.
    pub fn insert(&mut self, cell: Coord) -> Result<(), MatchError> {
        if self.cells.contains(&cell) {
            return Err(MatchError::DuplicateCell(cell));
        }
        if self.is_complete() {
            return Err(MatchError::PlacementFull);
        }
        self.cells.insert(cell);
        Ok(())
    }

    /// Remove a cell. Returns false if it was not placed.
    pub fn remove(&mut self, cell: Coord) -> bool {
        self.cells.remove(&cell)
    }

    /// Remove the cell if present, otherwise add it.
    pub fn toggle(&mut self, cell: Coord) -> Result<PlacementChange, MatchError> {
        if self.remove(cell) {
            Ok(PlacementChange::Removed(cell))
        } else {
            self.insert(cell)?;
            Ok(PlacementChange::Added(cell))
        }
    }

    #[must_use]
    pub fn contains(&self, cell: Coord) -> bool {
        self.cells.contains(&cell)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when exactly 4 cells are placed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cells.len() == BOTTLES_PER_SIDE
    }

    /// Check the placement can be locked in.
    pub fn validate_complete(&self) -> Result<(), MatchError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(MatchError::PlacementIncomplete {
                placed: self.cells.len(),
            })
        }
    }

    /// Structural check for placements arriving from outside (remote peers).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.cells.len() <= BOTTLES_PER_SIDE
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Cells in index order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }
}
