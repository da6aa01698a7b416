//! Match state machine shared by every mode.
//!
//! `Match` owns the placement, guessing and win rules. Mode resolvers
//! decide who calls into it and when; they never re-implement the rules.

pub mod phase;
pub mod event;
pub mod machine;

pub use phase::{Mode, Phase};
pub use event::MatchEvent;
pub use machine::{GuessReport, Match, MatchParts};
