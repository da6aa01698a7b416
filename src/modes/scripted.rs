//! Human (side A) against a scripted opponent (side B).
//!
//! The computer places at random when the human confirms, and its guesses
//! run as scheduled tasks: the first one `opponent_delay` after a human
//! miss, each follow-up `opponent_chain_delay` after a computer hit. A
//! computer miss hands the turn back.

use crate::core::{Coord, GameRng, MatchConfig, Placement, PlacementChange, Side};
use crate::error::{MatchError, SessionError, SyncError};
use crate::rules::{GuessReport, Match, MatchEvent, Mode, Phase};
use crate::schedule::{Clock, Scheduler};
use crate::search::{HuntTarget, TargetStrategy};

use super::resolver::ModeResolver;

const HUMAN: Side = Side::A;
const COMPUTER: Side = Side::B;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    OpponentMove,
}

pub struct ScriptedResolver<C: Clock, S: TargetStrategy> {
    game: Match,
    config: MatchConfig,
    clock: C,
    strategy: S,
    scheduler: Scheduler<Task>,
    rng: GameRng,
}

impl<C: Clock> ScriptedResolver<C, HuntTarget> {
    /// Scripted match against the hunt-target opponent.
    #[must_use]
    pub fn hunt_target(config: MatchConfig, clock: C) -> Self {
        let mut rng = GameRng::new(config.seed);
        let strategy = HuntTarget::new(rng.fork());
        Self::with_rng(config, clock, strategy, rng)
    }
}

impl<C: Clock, S: TargetStrategy> ScriptedResolver<C, S> {
    #[must_use]
    pub fn new(config: MatchConfig, clock: C, strategy: S) -> Self {
        let rng = GameRng::new(config.seed);
        Self::with_rng(config, clock, strategy, rng)
    }

    fn with_rng(config: MatchConfig, clock: C, mut strategy: S, rng: GameRng) -> Self {
        strategy.reset();
        Self {
            game: Match::new(Mode::Scripted, &config),
            config,
            clock,
            strategy,
            scheduler: Scheduler::new(),
            rng,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// When the next computer move is due, if one is pending.
    #[must_use]
    pub fn next_due(&self) -> Option<std::time::Duration> {
        self.scheduler.next_due()
    }

    fn schedule_move(&mut self, delay: std::time::Duration) {
        self.scheduler
            .schedule_after(self.clock.now(), delay, Task::OpponentMove);
    }

    fn opponent_move(&mut self) {
        if self.game.phase() != Phase::Guessing || self.game.turn() != COMPUTER {
            return;
        }

        let Some(cell) = self.strategy.next_guess() else {
            if let Err(err) = self.game.forfeit(COMPUTER) {
                log::warn!("computer could not forfeit: {err}");
            }
            return;
        };

        match self.game.guess(COMPUTER, cell) {
            Ok(report) => {
                self.strategy.register_result(cell, report.outcome.is_hit());
                if report.winner.is_none() && report.next_turn == COMPUTER {
                    self.schedule_move(self.config.opponent_chain_delay());
                }
            }
            Err(err) => {
                // Mark it tried so the strategy moves on.
                log::warn!("computer guess {cell} rejected: {err}");
                self.strategy.register_result(cell, false);
                self.schedule_move(self.config.opponent_chain_delay());
            }
        }
    }
}

impl<C: Clock, S: TargetStrategy> ModeResolver for ScriptedResolver<C, S> {
    fn mode(&self) -> Mode {
        Mode::Scripted
    }

    fn game(&self) -> &Match {
        &self.game
    }

    fn acting_side(&self) -> Option<Side> {
        match self.game.phase() {
            Phase::Placing(HUMAN) => Some(HUMAN),
            Phase::Guessing if self.game.turn() == HUMAN => Some(HUMAN),
            _ => None,
        }
    }

    fn set_name(&mut self, side: Side, name: &str) -> Result<(), SessionError> {
        if side == COMPUTER {
            return Err(MatchError::WrongPhase {
                action: "rename the computer",
                phase: self.game.phase(),
            }
            .into());
        }
        Ok(self.game.set_name(side, name)?)
    }

    fn confirm_names(&mut self) -> Result<(), SessionError> {
        Ok(self.game.confirm_names()?)
    }

    fn toggle_cell(&mut self, cell: Coord) -> Result<PlacementChange, SessionError> {
        Ok(self.game.toggle_cell(HUMAN, cell)?)
    }

    fn finish_placement(&mut self) -> Result<(), SessionError> {
        self.game.lock_placement(HUMAN)?;
        let placement = Placement::random(&mut self.rng);
        self.game.install_placement(COMPUTER, placement)?;
        Ok(())
    }

    fn guess(&mut self, cell: Coord) -> Result<GuessReport, SessionError> {
        let report = self.game.guess(HUMAN, cell)?;
        if report.winner.is_none() && report.next_turn == COMPUTER {
            self.schedule_move(self.config.opponent_delay());
        }
        Ok(report)
    }

    fn rematch(&mut self) -> Result<(), SessionError> {
        self.game.rematch()?;
        self.strategy.reset();
        self.scheduler.clear();
        Ok(())
    }

    fn leave(&mut self) -> Result<(), SessionError> {
        self.scheduler.clear();
        self.game.reset_to_menu();
        Ok(())
    }

    fn poll(&mut self) -> Vec<SyncError> {
        let now = self.clock.now();
        while let Some(task) = self.scheduler.pop_due(now) {
            match task {
                Task::OpponentMove => self.opponent_move(),
            }
        }
        Vec::new()
    }

    fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.game.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ManualClock;
    use std::time::Duration;

    /// Always guesses the cells in a fixed order.
    struct FixedOrder {
        cells: Vec<Coord>,
        next: usize,
        resets: usize,
    }

    impl FixedOrder {
        fn new(cells: &[&str]) -> Self {
            Self {
                cells: cells.iter().map(|c| c.parse().unwrap()).collect(),
                next: 0,
                resets: 0,
            }
        }
    }

    impl TargetStrategy for FixedOrder {
        fn next_guess(&mut self) -> Option<Coord> {
            let pick = self.cells.get(self.next).copied();
            self.next += 1;
            pick
        }

        fn register_result(&mut self, _cell: Coord, _hit: bool) {}

        fn reset(&mut self) {
            self.next = 0;
            self.resets += 1;
        }
    }

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn ready(strategy: FixedOrder) -> (ScriptedResolver<ManualClock, FixedOrder>, ManualClock) {
        let clock = ManualClock::new();
        let mut r = ScriptedResolver::new(MatchConfig::default(), clock.clone(), strategy);
        r.confirm_names().unwrap();
        for cell in ["A1", "A2", "A3", "A4"] {
            r.toggle_cell(c(cell)).unwrap();
        }
        r.finish_placement().unwrap();
        (r, clock)
    }

    /// A cell on the computer's board that holds no bottle.
    fn empty_cell(r: &ScriptedResolver<ManualClock, FixedOrder>) -> Coord {
        Coord::all()
            .find(|cell| !r.game().placement(COMPUTER).contains(*cell))
            .unwrap()
    }

    #[test]
    fn test_finish_placement_places_computer_and_starts() {
        let (r, _) = ready(FixedOrder::new(&[]));
        assert_eq!(r.game().phase(), Phase::Guessing);
        assert!(r.game().placement(COMPUTER).is_complete());
        assert_eq!(r.acting_side(), Some(HUMAN));
    }

    #[test]
    fn test_computer_waits_for_delay() {
        let (mut r, clock) = ready(FixedOrder::new(&["B1"]));
        let miss = empty_cell(&r);
        r.guess(miss).unwrap();
        assert_eq!(r.acting_side(), None);

        clock.advance(Duration::from_millis(899));
        r.poll();
        assert!(r.game().ledger(COMPUTER).is_empty());

        clock.advance(Duration::from_millis(1));
        r.poll();
        assert_eq!(r.game().ledger(COMPUTER).len(), 1);
        assert_eq!(r.game().turn(), HUMAN);
    }

    #[test]
    fn test_computer_chains_hits_then_wins() {
        let (mut r, clock) = ready(FixedOrder::new(&["A1", "A2", "A3", "A4"]));
        let miss = empty_cell(&r);
        r.guess(miss).unwrap();

        clock.advance(Duration::from_millis(900));
        r.poll();
        assert_eq!(r.game().ledger(COMPUTER).hits(), 1);
        assert_eq!(r.next_due(), Some(Duration::from_millis(1600)));

        for _ in 0..3 {
            clock.advance(Duration::from_millis(700));
            r.poll();
        }
        assert_eq!(r.game().winner(), Some(COMPUTER));
        assert!(r.next_due().is_none());
    }

    #[test]
    fn test_exhausted_strategy_forfeits() {
        let (mut r, clock) = ready(FixedOrder::new(&[]));
        let miss = empty_cell(&r);
        r.guess(miss).unwrap();
        clock.advance(Duration::from_secs(1));
        r.poll();

        assert_eq!(r.game().winner(), Some(HUMAN));
        assert!(r
            .drain_events()
            .contains(&MatchEvent::Forfeit(COMPUTER)));
    }

    #[test]
    fn test_rematch_resets_strategy_and_pending_moves() {
        let (mut r, clock) = ready(FixedOrder::new(&[]));
        let miss = empty_cell(&r);
        r.guess(miss).unwrap();
        clock.advance(Duration::from_secs(1));
        r.poll();

        r.rematch().unwrap();
        assert_eq!(r.strategy().resets, 2);
        assert!(r.next_due().is_none());
        assert_eq!(r.game().phase(), Phase::Placing(HUMAN));
        assert_eq!(r.game().name(COMPUTER), "Computer");
    }

    #[test]
    fn test_computer_cannot_be_renamed() {
        let clock = ManualClock::new();
        let mut r = ScriptedResolver::new(MatchConfig::default(), clock, FixedOrder::new(&[]));
        assert!(r.set_name(COMPUTER, "Hal").is_err());
        r.set_name(HUMAN, "Ada").unwrap();
        assert_eq!(r.game().name(HUMAN), "Ada");
    }
}
