//! Headless duel simulator.
//!
//! Plays N matches without any presentation and reports the outcome split.
//!
//! - `scripted`: a random guesser as side A against the hunt-target
//!   computer, on a manual clock that jumps to each scheduled move.
//! - `remote`: two hunt-target bots in one room of an in-process hub,
//!   sharing one identity (self-play).

use std::error::Error;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use flexi_logger::Logger;

use bottle_duel::core::{Coord, GameRng, MatchConfig, Placement, Side};
use bottle_duel::error::Result;
use bottle_duel::modes::{ModeResolver, ScriptedResolver};
use bottle_duel::schedule::ManualClock;
use bottle_duel::search::{HuntTarget, RandomGuess, TargetStrategy};
use bottle_duel::sync::{DocumentStore, Identity, MemoryHub, RemoteClient};

/// Upper bound on turns per remote match; 32 guesses always finish one.
const MAX_REMOTE_STEPS: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SimMode {
    Scripted,
    Remote,
}

#[derive(Parser, Debug)]
#[command(name = "duel-sim")]
#[command(about = "Play headless bottle duels and report results")]
struct Args {
    /// Number of matches to play
    #[arg(short, long, default_value_t = 100)]
    games: usize,

    /// Base RNG seed; match i uses seed + i
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Which resolver to exercise
    #[arg(short, long, value_enum, default_value_t = SimMode::Scripted)]
    mode: SimMode,
}

#[derive(Default, Debug)]
struct Tally {
    wins: [usize; 2],
    unfinished: usize,
    guesses: usize,
}

impl Tally {
    fn record(&mut self, winner: Option<Side>, guesses: usize) {
        match winner {
            Some(side) => self.wins[side.index()] += 1,
            None => self.unfinished += 1,
        }
        self.guesses += guesses;
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let args = Args::parse();
    log::info!("playing {} {:?} matches from seed {}", args.games, args.mode, args.seed);

    let mut tally = Tally::default();
    for i in 0..args.games {
        let seed = args.seed.wrapping_add(i as u64);
        let (winner, guesses) = match args.mode {
            SimMode::Scripted => play_scripted(seed)?,
            SimMode::Remote => play_remote(seed)?,
        };
        log::debug!("match {i}: winner {winner:?} after {guesses} guesses");
        tally.record(winner, guesses);
    }

    let played = args.games.max(1);
    println!(
        "side A {} / side B {} / unfinished {} (avg {:.1} guesses)",
        tally.wins[0],
        tally.wins[1],
        tally.unfinished,
        tally.guesses as f64 / played as f64
    );
    Ok(())
}

fn random_cells(rng: &mut GameRng) -> Vec<Coord> {
    Placement::random(rng).iter().collect()
}

fn play_scripted(seed: u64) -> Result<(Option<Side>, usize)> {
    let clock = ManualClock::new();
    let config = MatchConfig::default().with_seed(seed);
    let mut resolver = ScriptedResolver::hunt_target(config, clock.clone());
    let mut rng = GameRng::new(seed).fork();
    let mut player = RandomGuess::new(rng.fork());

    resolver.confirm_names()?;
    for cell in random_cells(&mut rng) {
        resolver.toggle_cell(cell)?;
    }
    resolver.finish_placement()?;

    while !resolver.game().is_finished() {
        if resolver.acting_side() == Some(Side::A) {
            let Some(cell) = player.next_guess() else { break };
            let report = resolver.guess(cell)?;
            player.register_result(cell, report.outcome.is_hit());
        } else if let Some(due) = resolver.next_due() {
            clock.set(due);
            resolver.poll();
        } else {
            break;
        }
    }

    let game = resolver.game();
    let guesses = game.ledger(Side::A).len() + game.ledger(Side::B).len();
    Ok((game.winner(), guesses))
}

struct Seat<S: DocumentStore> {
    client: RemoteClient<S>,
    strategy: HuntTarget,
}

fn play_remote(seed: u64) -> Result<(Option<Side>, usize)> {
    let hub = MemoryHub::new();
    let identity = Identity::new(format!("sim-{seed}"));
    let mut rng = GameRng::new(seed);

    let host = RemoteClient::create_room(
        hub.connect(),
        identity.clone(),
        "Host bot",
        &mut rng,
        Utc::now(),
    )?;
    let guest =
        RemoteClient::join_room(hub.connect(), host.code().as_str(), identity, "Guest bot")?;
    let mut seats = [
        Seat {
            client: host,
            strategy: HuntTarget::new(rng.fork()),
        },
        Seat {
            client: guest,
            strategy: HuntTarget::new(rng.fork()),
        },
    ];

    for seat in &mut seats {
        seat.client.pump();
        for cell in random_cells(&mut rng) {
            seat.client.toggle_cell(cell)?;
        }
        seat.client.submit_placement()?;
    }
    for seat in &mut seats {
        seat.client.pump();
    }

    for _ in 0..MAX_REMOTE_STEPS {
        if seats[0].client.game().is_finished() {
            break;
        }
        for seat in &mut seats {
            let my_turn = seat.client.view().is_some_and(|view| view.is_my_turn());
            if !my_turn {
                continue;
            }
            let Some(cell) = seat.strategy.next_guess() else { continue };
            let report = seat.client.guess(cell)?;
            seat.strategy.register_result(cell, report.outcome.is_hit());
        }
        for seat in &mut seats {
            seat.client.pump();
        }
    }

    let game = seats[0].client.game();
    let guesses = game.ledger(Side::A).len() + game.ledger(Side::B).len();
    Ok((game.winner(), guesses))
}
