//! The mode resolver seam.

use crate::core::{Coord, PlacementChange, Side};
use crate::error::{SessionError, SyncError};
use crate::rules::{GuessReport, Match, MatchEvent, Mode};

/// Decides who acts on a `Match` and when.
///
/// A front end only ever talks to a resolver: it forwards clicks, polls on
/// a timer, and renders `game()` plus the drained events. Which side a
/// click belongs to is the resolver's business, as is anything that
/// happens without a click (computer moves, remote snapshots).
pub trait ModeResolver {
    fn mode(&self) -> Mode;

    /// Current match state.
    fn game(&self) -> &Match;

    /// Side the local user is acting for right now, `None` while waiting
    /// on the computer or the remote peer.
    fn acting_side(&self) -> Option<Side>;

    /// Rename `side` during naming.
    fn set_name(&mut self, side: Side, name: &str) -> Result<(), SessionError>;

    /// Leave naming.
    fn confirm_names(&mut self) -> Result<(), SessionError>;

    /// Toggle a cell of the acting side's placement.
    fn toggle_cell(&mut self, cell: Coord) -> Result<PlacementChange, SessionError>;

    /// Confirm the acting side's placement.
    fn finish_placement(&mut self) -> Result<(), SessionError>;

    /// Guess for the acting side.
    fn guess(&mut self, cell: Coord) -> Result<GuessReport, SessionError>;

    /// Start a new round after a finished one.
    fn rematch(&mut self) -> Result<(), SessionError>;

    /// Abandon the match.
    fn leave(&mut self) -> Result<(), SessionError>;

    /// Run whatever is due: scheduled moves, inbound snapshots. Returns
    /// snapshot failures, which are informational only.
    fn poll(&mut self) -> Vec<SyncError>;

    fn drain_events(&mut self) -> Vec<MatchEvent>;
}
