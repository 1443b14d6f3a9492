use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail};
use chrono::Local;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::info;

use swissdraw::comp::Competition;
use swissdraw::data;
use swissdraw::domain::Roster;
use swissdraw::print::tabulate_summary;
use swissdraw::sim::{write_results, SimConfig, Simulator};

/// Simulates league-phase draws and writes per-pair meeting counts.
#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// season year the data directory is keyed by
    year: u32,

    /// competition to simulate
    #[clap(value_parser = parse_competition)]
    competition: Competition,

    /// number of draws to simulate
    iterations: u64,

    /// teams CSV (defaults to data/<year>/<competition>/teams.csv)
    teams: Option<PathBuf>,

    /// results CSV (defaults to results/<competition>_<year>_<iterations>_<timestamp>.csv)
    output: Option<PathBuf>,

    /// outer worker threads (defaults to the hardware concurrency)
    #[clap(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// dump each failed draw's fixtures under failures/
    #[clap(long)]
    dump_failures: bool,
}

impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.year == 0 {
            bail!("year must be positive");
        }
        if self.iterations == 0 {
            bail!("at least one iteration is required");
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

    let teams_path = args
        .teams
        .clone()
        .unwrap_or_else(|| data::default_teams_path(args.year, args.competition));
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| data::default_results_path(args.year, args.competition, args.iterations));

    let teams = data::read_teams_csv(&teams_path)?;
    let banned = data::read_banned_pairs(data::default_banned_path(args.year))?;
    info!(
        "{} teams from {}, {} banned country pairs",
        teams.len(),
        teams_path.display(),
        banned.len()
    );
    let roster = std::sync::Arc::new(Roster::new(args.competition.format(), teams, &banned)?);

    let failure_dir = args.dump_failures.then(|| {
        PathBuf::from("failures").join(format!(
            "{}_{}",
            args.competition,
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });

    let simulator = Simulator::new(
        std::sync::Arc::clone(&roster),
        SimConfig {
            competition: args.competition,
            year: args.year,
            iterations: args.iterations,
            threads: args.threads,
            failure_dir,
        },
    );
    let outcome = simulator.run()?;
    write_results(
        &output_path,
        &roster,
        args.competition,
        args.year,
        args.iterations,
        &outcome.counts,
    )?;

    let summary = tabulate_summary(
        args.iterations,
        outcome.failures,
        outcome.mean_draw.as_secs_f64(),
        &output_path.display().to_string(),
    );
    println!("{}", Console::default().render(&summary));
    Ok(())
}
