use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tinyrand::Rand;
use tinyrand_std::ClockSeed;
use tracing::info;

use swissdraw::comp::Competition;
use swissdraw::data;
use swissdraw::domain::Roster;
use swissdraw::draw::{Draw, DrawError};
use swissdraw::print::{display_game, tabulate_pots};
use swissdraw::search::Executor;

/// Runs a single draw with full output, in the televised pot-by-pot order.
#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// season year the data directory is keyed by
    year: u32,

    /// competition to draw
    #[clap(value_parser = parse_competition)]
    competition: Competition,

    /// fixtures to commit before the draw starts, one HOME-AWAY per line
    initial_games: Option<PathBuf>,

    /// PRNG seed (defaults to clock entropy)
    #[clap(short = 's', long)]
    seed: Option<u64>,
}

impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.year == 0 {
            bail!("year must be positive");
        }
        Ok(())
    }
}

fn parse_competition(s: &str) -> anyhow::Result<Competition> {
    s.to_lowercase()
        .parse()
        .map_err(|_| anyhow!("unsupported competition {s}, expected ucl, uel or uecl"))
}

fn main() -> anyhow::Result<()> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(error) => {
            let _ = error.print();
            process::exit(1);
        }
    };
    if let Err(error) = args.validate() {
        eprintln!("{error}");
        process::exit(1);
    }

    let teams = data::read_teams_csv(data::default_teams_path(args.year, args.competition))?;
    let banned = data::read_banned_pairs(data::default_banned_path(args.year))?;
    let roster =
        std::sync::Arc::new(Roster::new(args.competition.format(), teams, &banned)?);

    let initial = match &args.initial_games {
        Some(path) => data::read_initial_games(path, &roster)?,
        None => Vec::new(),
    };
    let seed = args
        .seed
        .unwrap_or_else(|| ClockSeed::default().next_u64());
    info!(
        "drawing {} with {} seeded fixtures, seed {seed}",
        args.competition,
        initial.len()
    );

    let mut draw = Draw::new(
        std::sync::Arc::clone(&roster),
        &initial,
        seed,
        Executor::Threads,
    );
    let result = draw.run_televised(
        |team, state| {
            let drawn = state.roster().team(team);
            println!("\nPot {}: {} ({})", drawn.pot, drawn.abbrev, drawn.country);
            for &game in state.games_of(team) {
                println!("  {}", display_game(state.roster(), game));
            }
        },
        |game, state| {
            println!(
                "  {}\t{} candidates left",
                display_game(state.roster(), game),
                state.remaining().len()
            );
        },
    );

    match result {
        Ok(()) => {
            println!();
            for table in tabulate_pots(draw.state()) {
                println!("{}", Console::default().render(&table));
            }
            match draw.verify() {
                Ok(()) => {
                    println!("Draw has been verified and is valid.");
                    Ok(())
                }
                Err(error) => {
                    eprintln!("INVALID DRAW: {error}");
                    process::exit(2);
                }
            }
        }
        Err(DrawError::Exhausted) => {
            eprintln!("{}", DrawError::Exhausted);
            for table in tabulate_pots(draw.state()) {
                println!("{}", Console::default().render(&table));
            }
            process::exit(2);
        }
        Err(DrawError::Timeout) => {
            eprintln!("{}", DrawError::Timeout);
            process::exit(2);
        }
    }
}
