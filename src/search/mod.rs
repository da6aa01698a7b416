//! Opponent search.
//!
//! Strategies are trait-based so the scripted resolver can run any of them:
//! - `HuntTarget`: parity hunt plus neighbor follow-up after hits
//! - `RandomGuess`: uniform baseline

pub mod strategy;
pub mod hunt_target;

pub use strategy::{RandomGuess, TargetStrategy};
pub use hunt_target::HuntTarget;
