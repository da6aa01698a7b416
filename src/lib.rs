//! # bottle-duel
//!
//! Session engine for a two-sided hidden-target duel on a 4x4 board. Each
//! side hides 4 bottles; sides take turns guessing cells of the other's
//! board, a hit keeps the turn, and the first side with 4 hits wins.
//!
//! ## Design Principles
//!
//! 1. **One Rule Book**: every mode drives the same `Match` state machine.
//!    Modes decide who acts and when, never what a guess means.
//!
//! 2. **Derived, Not Synced**: in remote mode the shared document is the
//!    only truth. Local state is rebuilt from each snapshot by a pure
//!    function, so duplicate or late snapshots cannot corrupt it.
//!
//! 3. **Events Out**: the engine emits `MatchEvent`s and never does any
//!    presentation itself.
//!
//! ## Modules
//!
//! - `core`: coordinates, sides, placements, ledgers, RNG, configuration
//! - `search`: target strategies for the scripted opponent
//! - `rules`: the match state machine and its events
//! - `schedule`: clocks and the deferred task queue
//! - `modes`: scripted, hotseat and remote resolvers
//! - `sync`: the remote document, its store and the remote client
//! - `error`: error types per concern

pub mod core;
pub mod search;
pub mod rules;
pub mod schedule;
pub mod modes;
pub mod sync;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Coord, Side, SideMap,
    Placement, PlacementChange, Ledger, Outcome,
    GameRng, GameRngState, MatchConfig,
};

pub use crate::search::{HuntTarget, RandomGuess, TargetStrategy};

pub use crate::rules::{GuessReport, Match, MatchEvent, Mode, Phase};

pub use crate::schedule::{Clock, ManualClock, Scheduler, SystemClock};

pub use crate::modes::{HotseatResolver, ModeResolver, RemoteResolver, ScriptedResolver};

pub use crate::sync::{
    DocumentStore, Identity, LocalView, MemoryHub, RemoteClient, Role,
    RoleMemory, RoomCode, RoomDocument, RoomStatus,
};

pub use crate::error::{JoinError, MatchError, Result, SessionError, SyncError};
