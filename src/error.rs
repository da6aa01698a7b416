//! Error types.
//!
//! Nothing here is fatal to the process. Every error is contained to one
//! match session:
//!
//! - `MatchError`: validation, recovered locally with a user-facing message
//!   and no state mutation.
//! - `JoinError`: joining or resuming a room failed; the user may retry.
//! - `SyncError`: the shared document could not be read, written or decoded.
//!   Not retried; the next good snapshot re-derives everything.

use thiserror::Error;

use crate::core::Coord;
use crate::rules::Phase;
use crate::sync::{Role, RoomCode};

/// Rejected move or placement. Display strings are user-facing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("cannot {action} during {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("{0} was already guessed")]
    AlreadyGuessed(Coord),

    #[error("{0} already holds a bottle")]
    DuplicateCell(Coord),

    #[error("all 4 bottles are already placed")]
    PlacementFull,

    #[error("place all 4 bottles before continuing ({placed}/4 placed)")]
    PlacementIncomplete { placed: usize },
}

/// Joining or resuming a remote room failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("invalid room code {0:?}")]
    InvalidCode(String),

    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    #[error("room {0} already has another guest")]
    RoomTaken(RoomCode),

    #[error("room {0} is closed")]
    RoomClosed(RoomCode),

    #[error("not a participant of room {0}")]
    NotParticipant(RoomCode),

    #[error("cannot tell host from guest in room {0} without a remembered role")]
    AmbiguousRole(RoomCode),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Shared document access failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("room {0} already exists")]
    RoomExists(RoomCode),

    #[error("room {0} was deleted")]
    DocumentDeleted(RoomCode),

    #[error("{role} may not write {field}")]
    Ownership { role: Role, field: &'static str },

    #[error("snapshot codec error: {0}")]
    Codec(String),
}

impl From<bincode::Error> for SyncError {
    fn from(err: bincode::Error) -> Self {
        SyncError::Codec(err.to_string())
    }
}

/// Any failure from a mode resolver.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result type alias for convenience
pub type Result<T, E = SessionError> = std::result::Result<T, E>;
