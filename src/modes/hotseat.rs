//! Two players sharing one device.
//!
//! Side A places, then side B; guessing alternates by the normal turn rule.
//! Every click belongs to whichever side the phase or turn names.

use crate::core::{Coord, MatchConfig, PlacementChange, Side};
use crate::error::{MatchError, SessionError, SyncError};
use crate::rules::{GuessReport, Match, MatchEvent, Mode, Phase};

use super::resolver::ModeResolver;

pub struct HotseatResolver {
    game: Match,
}

impl HotseatResolver {
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            game: Match::new(Mode::Hotseat, config),
        }
    }

    fn placing_side(&self, action: &'static str) -> Result<Side, MatchError> {
        match self.game.phase() {
            Phase::Placing(side) => Ok(side),
            phase => Err(MatchError::WrongPhase { action, phase }),
        }
    }
}

impl ModeResolver for HotseatResolver {
    fn mode(&self) -> Mode {
        Mode::Hotseat
    }

    fn game(&self) -> &Match {
        &self.game
    }

    fn acting_side(&self) -> Option<Side> {
        match self.game.phase() {
            Phase::Placing(side) => Some(side),
            Phase::Guessing => Some(self.game.turn()),
            _ => None,
        }
    }

    fn set_name(&mut self, side: Side, name: &str) -> Result<(), SessionError> {
        Ok(self.game.set_name(side, name)?)
    }

    fn confirm_names(&mut self) -> Result<(), SessionError> {
        Ok(self.game.confirm_names()?)
    }

    fn toggle_cell(&mut self, cell: Coord) -> Result<PlacementChange, SessionError> {
        let side = self.placing_side("place")?;
        Ok(self.game.toggle_cell(side, cell)?)
    }

    fn finish_placement(&mut self) -> Result<(), SessionError> {
        let side = self.placing_side("confirm placement")?;
        Ok(self.game.lock_placement(side)?)
    }

    fn guess(&mut self, cell: Coord) -> Result<GuessReport, SessionError> {
        let side = self.game.turn();
        Ok(self.game.guess(side, cell)?)
    }

    fn rematch(&mut self) -> Result<(), SessionError> {
        Ok(self.game.rematch()?)
    }

    fn leave(&mut self) -> Result<(), SessionError> {
        self.game.reset_to_menu();
        Ok(())
    }

    fn poll(&mut self) -> Vec<SyncError> {
        Vec::new()
    }

    fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.game.drain_events()
    }
}
