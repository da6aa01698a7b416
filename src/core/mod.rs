//! Core types: coordinates, sides, placements, ledgers, RNG, configuration.
//!
//! Everything here is mode-agnostic. The state machine in `rules` and the
//! remote document in `sync` are both built from these pieces.

pub mod coord;
pub mod side;
pub mod placement;
pub mod ledger;
pub mod rng;
pub mod config;

pub use coord::{Coord, ParseCoordError, CELL_COUNT, GRID_SIZE};
pub use side::{Side, SideMap};
pub use placement::{Placement, PlacementChange, BOTTLES_PER_SIDE};
pub use ledger::{Ledger, Outcome};
pub use rng::{GameRng, GameRngState};
pub use config::MatchConfig;
