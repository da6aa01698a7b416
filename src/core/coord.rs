//! Board coordinates.
//!
//! The board is a fixed 4x4 grid: columns `A`-`D`, rows `1`-`4`.
//! Every coordinate has a stable linear index in `0..16`, laid out
//! column-major (column outer, row inner):
//!
//! ```text
//!        A   B   C   D
//!   1    0   4   8  12
//!   2    1   5   9  13
//!   3    2   6  10  14
//!   4    3   7  11  15
//! ```
//!
//! Construction is the only fallible boundary. Once a `Coord` exists it is
//! on-grid, so every other operation is total.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Number of columns (and rows) on the board.
pub const GRID_SIZE: u8 = 4;

/// Total number of cells on the board.
pub const CELL_COUNT: usize = (GRID_SIZE as usize) * (GRID_SIZE as usize);

const COLUMN_LABELS: [char; GRID_SIZE as usize] = ['A', 'B', 'C', 'D'];

/// A single on-grid cell.
///
/// Serializes as its `"A1"` label so it can key JSON maps in the shared
/// document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coord {
    col: u8,
    row: u8,
}

impl Coord {
    /// Create a coordinate from 0-based column and row.
    ///
    /// Returns `None` if either component is off-grid.
    #[must_use]
    pub const fn new(col: u8, row: u8) -> Option<Self> {
        if col < GRID_SIZE && row < GRID_SIZE {
            Some(Self { col, row })
        } else {
            None
        }
    }

    /// Coordinate for a linear index, or `None` if `index >= 16`.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < CELL_COUNT {
            Some(Self {
                col: (index / GRID_SIZE as usize) as u8,
                row: (index % GRID_SIZE as usize) as u8,
            })
        } else {
            None
        }
    }

    /// Linear index in `0..16`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.col as usize * GRID_SIZE as usize + self.row as usize
    }

    /// 0-based column (A = 0).
    #[must_use]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// 0-based row (1 = 0).
    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// All 16 coordinates in index order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..CELL_COUNT).filter_map(Coord::from_index)
    }

    /// Orthogonal neighbors (up, down, left, right) that are on the grid.
    #[must_use]
    pub fn neighbors(self) -> SmallVec<[Coord; 4]> {
        let col = self.col as i8;
        let row = self.row as i8;

        [(0, -1), (0, 1), (-1, 0), (1, 0)]
            .into_iter()
            .filter_map(|(dc, dr)| {
                let c = col + dc;
                let r = row + dr;
                if c < 0 || r < 0 {
                    None
                } else {
                    Coord::new(c as u8, r as u8)
                }
            })
            .collect()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", COLUMN_LABELS[self.col as usize], self.row + 1)
    }
}

/// Rejected coordinate label.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid coordinate {0:?}: expected a column A-D followed by a row 1-4")]
pub struct ParseCoordError(pub String);

impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordError(s.to_string());
        let mut chars = s.trim().chars();

        let col_char = chars.next().ok_or_else(err)?.to_ascii_uppercase();
        let row_char = chars.next().ok_or_else(err)?;
        if chars.next().is_some() {
            return Err(err());
        }

        let col = COLUMN_LABELS
            .iter()
            .position(|&c| c == col_char)
            .ok_or_else(err)? as u8;
        let row = row_char
            .to_digit(10)
            .filter(|d| (1..=GRID_SIZE as u32).contains(d))
            .ok_or_else(err)? as u8
            - 1;

        Coord::new(col, row).ok_or_else(err)
    }
}

impl TryFrom<String> for Coord {
    type Error = ParseCoordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coord> for String {
    fn from(coord: Coord) -> Self {
        coord.to_string()
    }
}
