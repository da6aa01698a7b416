//! Match events.
//!
//! The state machine emits these and never performs presentation itself.
//! Sound, animation and notifications subscribe to the event stream.

use serde::{Deserialize, Serialize};

use crate::core::{Coord, Outcome, PlacementChange, Side};

use super::phase::Phase;

/// Something that happened in a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// The match moved to a new phase.
    PhaseChanged(Phase),

    /// A placement cell was toggled.
    Placed { side: Side, change: PlacementChange },

    /// A guess was recorded in `side`'s ledger.
    Guessed {
        side: Side,
        cell: Coord,
        outcome: Outcome,
    },

    /// The turn passed to this side.
    TurnChanged(Side),

    /// This side reached 4 hits.
    Won(Side),

    /// This side could not move and conceded.
    Forfeit(Side),

    /// Placements, ledgers and winner were cleared for a new round.
    RematchStarted,

    /// The remote peer left the room.
    OpponentLeft,

    /// The shared document disappeared.
    RoomDeleted,
}

impl MatchEvent {
    /// True for events that end the current round.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MatchEvent::Won(_) | MatchEvent::OpponentLeft | MatchEvent::RoomDeleted
        )
    }
}
