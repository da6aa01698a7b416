//! Target-selection strategies for scripted players.

use rustc_hash::FxHashSet;

use crate::core::{Coord, GameRng};

/// Chooses a scripted player's next guess.
///
/// Implementations see nothing but their own guesses and outcomes.
pub trait TargetStrategy {
    /// Next cell to guess, or `None` when every cell has been tried.
    fn next_guess(&mut self) -> Option<Coord>;

    /// Record the outcome of a guess made at `cell`.
    fn register_result(&mut self, cell: Coord, hit: bool);

    /// Forget everything. Called at the start of every match, rematches included.
    fn reset(&mut self);
}

/// Uniform random guessing with no follow-up. Baseline opponent.
#[derive(Clone, Debug)]
pub struct RandomGuess {
    tried: FxHashSet<Coord>,
    rng: GameRng,
}

impl RandomGuess {
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self {
            tried: FxHashSet::default(),
            rng,
        }
    }
}

impl TargetStrategy for RandomGuess {
    fn next_guess(&mut self) -> Option<Coord> {
        let untried: Vec<Coord> = Coord::all().filter(|c| !self.tried.contains(c)).collect();
        self.rng.choose(&untried).copied()
    }

    fn register_result(&mut self, cell: Coord, _hit: bool) {
        self.tried.insert(cell);
    }

    fn reset(&mut self) {
        self.tried.clear();
    }
}
