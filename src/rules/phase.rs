//! Match phases and modes.

use serde::{Deserialize, Serialize};

use crate::core::Side;

/// How the two sides are driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Side B is the computer.
    Scripted,
    /// Both sides share one device.
    Hotseat,
    /// Side B (or A) is a remote peer.
    Remote,
}

/// Match phase.
///
/// ```text
/// Menu -> Naming -> Placing(A) -> [Placing(B), hotseat only] -> Guessing -> Finished
///                       ^                                                    |
///                       +------------------------ rematch -------------------+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Menu,
    Naming,
    Placing(Side),
    Guessing,
    Finished,
}

impl Phase {
    #[must_use]
    pub fn is_placing(self) -> bool {
        matches!(self, Phase::Placing(_))
    }

    /// Guessing has started (or already ended).
    #[must_use]
    pub fn is_in_game(self) -> bool {
        matches!(self, Phase::Guessing | Phase::Finished)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Menu => write!(f, "menu"),
            Phase::Naming => write!(f, "naming"),
            Phase::Placing(side) => write!(f, "placing ({side})"),
            Phase::Guessing => write!(f, "guessing"),
            Phase::Finished => write!(f, "finished"),
        }
    }
}
