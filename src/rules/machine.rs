//! The match state machine.
//!
//! One `Match` holds both placements, both ledgers, the turn and the winner.
//! All three modes drive the same machine; they differ only in who calls
//! `guess` and when.
//!
//! ## Rules
//!
//! - A guess is recorded in the guesser's ledger with outcome = membership
//!   of the cell in the opponent's placement.
//! - A hit keeps the turn. A miss passes it.
//! - After every recorded guess, 4 hits in the guesser's ledger finishes the
//!   match with the guesser as winner.
//! - Re-guessing a cell is rejected and changes nothing.

use crate::core::{
    Coord, Ledger, MatchConfig, Outcome, Placement, PlacementChange, Side, SideMap,
};
use crate::error::MatchError;

use super::event::MatchEvent;
use super::phase::{Mode, Phase};

/// Result of one accepted guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuessReport {
    pub side: Side,
    pub cell: Coord,
    pub outcome: Outcome,
    /// Side holding the turn after the guess.
    pub next_turn: Side,
    /// Set when this guess ended the match.
    pub winner: Option<Side>,
}

/// Raw match contents, used to rebuild a match from a remote document.
#[derive(Clone, Debug, Default)]
pub struct MatchParts {
    pub names: SideMap<String>,
    pub placements: SideMap<Placement>,
    pub locked: SideMap<bool>,
    pub ledgers: SideMap<Ledger>,
    pub turn: Option<Side>,
    pub winner: Option<Side>,
    /// Phase dictated by the caller. Ignored once a winner is known.
    pub phase: Option<Phase>,
}

/// Aggregate state of one duel.
#[derive(Clone, Debug)]
pub struct Match {
    mode: Mode,
    phase: Phase,
    names: SideMap<String>,
    placements: SideMap<Placement>,
    /// Placement confirmed and no longer editable.
    locked: SideMap<bool>,
    ledgers: SideMap<Ledger>,
    turn: Side,
    winner: Option<Side>,
    events: Vec<MatchEvent>,
}

impl Match {
    /// Create a match for a chosen mode. Starts in `Naming`.
    #[must_use]
    pub fn new(mode: Mode, config: &MatchConfig) -> Self {
        let mut names = SideMap::from_pair(
            config.default_names[0].clone(),
            config.default_names[1].clone(),
        );
        if mode == Mode::Scripted {
            names[Side::B] = config.computer_name.clone();
        }

        Self {
            mode,
            phase: Phase::Naming,
            names,
            placements: SideMap::with_default(),
            locked: SideMap::with_value(false),
            ledgers: SideMap::with_default(),
            turn: Side::A,
            winner: None,
            events: Vec::new(),
        }
    }

    /// Rebuild a match from externally held state.
    ///
    /// Unless `parts.phase` says otherwise, the phase is derived: a winner
    /// means `Finished`, two locked placements mean `Guessing`, otherwise
    /// the first unlocked side is placing. A ledger already holding 4 hits
    /// sets the winner even if `parts.winner` is unset, so remote wins
    /// follow the same path as local ones. Ledgers are not consulted when
    /// the dictated phase is a setup phase.
    #[must_use]
    pub fn from_parts(mode: Mode, parts: MatchParts) -> Self {
        let ledgers_count = parts.phase.map_or(true, Phase::is_in_game);
        let derived_winner = parts.winner.or_else(|| {
            Side::BOTH
                .into_iter()
                .filter(|_| ledgers_count)
                .find(|&side| parts.ledgers[side].has_won())
        });

        let phase = if derived_winner.is_some() {
            Phase::Finished
        } else if let Some(phase) = parts.phase {
            phase
        } else if parts.locked[Side::A] && parts.locked[Side::B] {
            Phase::Guessing
        } else if !parts.locked[Side::A] {
            Phase::Placing(Side::A)
        } else {
            Phase::Placing(Side::B)
        };

        Self {
            mode,
            phase,
            names: parts.names,
            placements: parts.placements,
            locked: parts.locked,
            ledgers: parts.ledgers,
            turn: parts.turn.unwrap_or(Side::A),
            winner: derived_winner,
            events: Vec::new(),
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn name(&self, side: Side) -> &str {
        &self.names[side]
    }

    #[must_use]
    pub fn placement(&self, side: Side) -> &Placement {
        &self.placements[side]
    }

    #[must_use]
    pub fn is_locked(&self, side: Side) -> bool {
        self.locked[side]
    }

    /// Guesses made by `side`.
    #[must_use]
    pub fn ledger(&self, side: Side) -> &Ledger {
        &self.ledgers[side]
    }

    #[must_use]
    pub fn turn(&self) -> Side {
        self.turn
    }

    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    // === Transitions ===

    fn require_phase(&self, action: &'static str, ok: bool) -> Result<(), MatchError> {
        if ok {
            Ok(())
        } else {
            Err(MatchError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            log::info!("match phase {} -> {}", self.phase, phase);
            self.phase = phase;
            self.events.push(MatchEvent::PhaseChanged(phase));
        }
    }

    /// Set a side's display name. Blank names keep the current one.
    pub fn set_name(&mut self, side: Side, name: &str) -> Result<(), MatchError> {
        self.require_phase("rename", self.phase == Phase::Naming)?;
        let name = name.trim();
        if !name.is_empty() {
            self.names[side] = name.to_string();
        }
        Ok(())
    }

    /// Leave naming and start placing side A.
    pub fn confirm_names(&mut self) -> Result<(), MatchError> {
        self.require_phase("confirm names", self.phase == Phase::Naming)?;
        self.enter(Phase::Placing(Side::A));
        Ok(())
    }

    /// Add or remove one cell of `side`'s placement.
    pub fn toggle_cell(&mut self, side: Side, cell: Coord) -> Result<PlacementChange, MatchError> {
        self.require_phase(
            "place",
            self.phase == Phase::Placing(side) && !self.locked[side],
        )?;
        let change = self.placements[side].toggle(cell)?;
        self.events.push(MatchEvent::Placed { side, change });
        Ok(change)
    }

    /// Replace `side`'s placement wholesale (computer placement).
    pub fn install_placement(
        &mut self,
        side: Side,
        placement: Placement,
    ) -> Result<(), MatchError> {
        self.require_phase("place", self.phase.is_placing() && !self.locked[side])?;
        placement.validate_complete()?;
        self.placements[side] = placement;
        self.locked[side] = true;
        self.advance_after_lock(side);
        Ok(())
    }

    /// Confirm `side`'s placement.
    ///
    /// Rejected with a validation error unless exactly 4 cells are placed.
    /// Once both sides are locked the match enters `Guessing`; in hotseat
    /// mode locking side A hands placement to side B.
    pub fn lock_placement(&mut self, side: Side) -> Result<(), MatchError> {
        self.require_phase(
            "confirm placement",
            self.phase == Phase::Placing(side) && !self.locked[side],
        )?;
        self.placements[side].validate_complete()?;
        self.locked[side] = true;
        self.advance_after_lock(side);
        Ok(())
    }

    fn advance_after_lock(&mut self, side: Side) {
        let other = side.other();
        if self.locked[other] {
            self.turn = Side::A;
            self.enter(Phase::Guessing);
        } else if self.mode == Mode::Hotseat && self.phase == Phase::Placing(side) {
            self.enter(Phase::Placing(other));
        }
    }

    /// Make a guess for `side`.
    pub fn guess(&mut self, side: Side, cell: Coord) -> Result<GuessReport, MatchError> {
        self.require_phase("guess", self.phase == Phase::Guessing)?;
        if self.turn != side {
            return Err(MatchError::NotYourTurn);
        }

        let outcome = Outcome::of(self.placements[side.other()].contains(cell));
        if let Err(err) = self.ledgers[side].record(cell, outcome) {
            log::debug!("{side} re-guessed {cell}, ignored");
            return Err(err);
        }
        log::debug!("{side} guessed {cell}: {outcome:?}");
        self.events.push(MatchEvent::Guessed { side, cell, outcome });

        if self.ledgers[side].has_won() {
            self.finish(side);
        } else if outcome == Outcome::Miss {
            self.turn = side.other();
            self.events.push(MatchEvent::TurnChanged(self.turn));
        }

        Ok(GuessReport {
            side,
            cell,
            outcome,
            next_turn: self.turn,
            winner: self.winner,
        })
    }

    fn finish(&mut self, winner: Side) {
        if self.winner.is_some() {
            return;
        }
        log::info!("{winner} ({}) wins", self.names[winner]);
        self.winner = Some(winner);
        self.events.push(MatchEvent::Won(winner));
        self.enter(Phase::Finished);
    }

    /// `side` cannot move; the other side wins.
    pub fn forfeit(&mut self, side: Side) -> Result<(), MatchError> {
        self.require_phase("forfeit", self.phase == Phase::Guessing)?;
        log::warn!("{side} forfeits");
        self.events.push(MatchEvent::Forfeit(side));
        self.finish(side.other());
        Ok(())
    }

    /// Clear placements, ledgers and winner and return to placing.
    /// Names and mode are preserved.
    pub fn rematch(&mut self) -> Result<(), MatchError> {
        self.require_phase("rematch", self.phase == Phase::Finished)?;
        self.placements = SideMap::with_default();
        self.locked = SideMap::with_value(false);
        self.ledgers = SideMap::with_default();
        self.winner = None;
        self.turn = Side::A;
        self.events.push(MatchEvent::RematchStarted);
        self.enter(Phase::Placing(Side::A));
        Ok(())
    }

    /// Abandon the match and go back to the menu.
    pub fn reset_to_menu(&mut self) {
        self.enter(Phase::Menu);
    }
}
