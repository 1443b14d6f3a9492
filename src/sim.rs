//! Monte Carlo simulation: many independent draws over a two-tier worker
//! pool, per-pair aggregation, and the results CSV.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Local;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::ThreadPool;
use rustc_hash::FxHashMap;
use tinyrand::Rand;
use tinyrand_std::ClockSeed;
use tracing::{debug, info, warn};

use crate::comp::Competition;
use crate::csv::CsvWriter;
use crate::data;
use crate::domain::{Game, Roster};
use crate::draw::Draw;
use crate::progress::ProgressBar;
use crate::search::Executor;
use crate::timed::Timed;

pub struct SimConfig {
    pub competition: Competition,
    pub year: u32,
    pub iterations: u64,
    /// Outer pool size; zero means the hardware concurrency.
    pub threads: usize,
    /// Directory to dump each failed draw's fixtures into, if any.
    pub failure_dir: Option<PathBuf>,
}

pub struct SimOutcome {
    /// Fixture counts keyed by the directed (home, away) team pair.
    pub counts: FxHashMap<(usize, usize), u64>,
    /// Draws that timed out or failed verification and were retried.
    pub failures: u64,
    pub mean_draw: Duration,
}

pub struct Simulator {
    roster: Arc<Roster>,
    config: SimConfig,
}

impl Simulator {
    pub fn new(roster: Arc<Roster>, config: SimConfig) -> Self {
        Self { roster, config }
    }

    /// Runs the configured number of draws and merges the per-slot counters.
    /// Every iteration produces a verified draw; recoverable failures along
    /// the way are counted, not surfaced.
    pub fn run(&self) -> anyhow::Result<SimOutcome> {
        let outer_threads = match self.config.threads {
            0 => thread::available_parallelism()?.get(),
            explicit => explicit,
        };
        let outer = rayon::ThreadPoolBuilder::new()
            .num_threads(outer_threads)
            .build()
            .context("building the simulation pool")?;
        let inner = Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(3 * outer_threads)
                .build()
                .context("building the search pool")?,
        );
        if let Some(dir) = &self.config.failure_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating failure dir {}", dir.display()))?;
        }

        let slots: Vec<Mutex<FxHashMap<(usize, usize), u64>>> =
            (0..outer_threads).map(|_| Mutex::default()).collect();
        let completed = AtomicU64::new(0);
        let failures = AtomicU64::new(0);
        let failure_seq = AtomicU64::new(0);
        let spent_micros = AtomicU64::new(0);
        let finished = AtomicBool::new(false);
        let bar = ProgressBar::new(self.config.iterations);
        let started = Instant::now();

        info!(
            "simulating {} {} draws on {} workers",
            self.config.iterations, self.config.competition, outer_threads
        );

        thread::scope(|scope| {
            let sampler = scope.spawn(|| {
                while !finished.load(Ordering::Relaxed) {
                    let done = completed.load(Ordering::Relaxed);
                    eprint!("\r{}", bar.render(done, started.elapsed()));
                    let _ = io::stderr().flush();
                    thread::sleep(Duration::from_millis(100));
                }
                let done = completed.load(Ordering::Relaxed);
                eprintln!("\r{}", bar.render(done, started.elapsed()));
            });

            outer.install(|| {
                (0..self.config.iterations).into_par_iter().for_each(|_| {
                    let timed = Timed::run(|| {
                        self.simulate_once(&inner, &failures, &failure_seq, Vec::new())
                    });
                    spent_micros.fetch_add(timed.elapsed.as_micros() as u64, Ordering::Relaxed);
                    let slot = rayon::current_thread_index().unwrap_or(0);
                    let mut counts = slots[slot].lock().unwrap();
                    for game in &timed.value {
                        *counts.entry((game.home, game.away)).or_insert(0) += 1;
                    }
                    drop(counts);
                    completed.fetch_add(1, Ordering::Relaxed);
                });
            });

            finished.store(true, Ordering::Relaxed);
            let _ = sampler.join();
        });

        let mut counts = FxHashMap::default();
        for slot in &slots {
            for (&pair, &count) in slot.lock().unwrap().iter() {
                *counts.entry(pair).or_insert(0) += count;
            }
        }
        let failures = failures.load(Ordering::Relaxed);
        let done = completed.load(Ordering::Relaxed).max(1);
        let mean_draw = Duration::from_micros(spent_micros.load(Ordering::Relaxed) / done);
        info!("{failures} failed draws, mean {mean_draw:?} per iteration");

        Ok(SimOutcome {
            counts,
            failures,
            mean_draw,
        })
    }

    /// One task: draw until verified. A failed draw's committed fixtures seed
    /// the retry, so progress is never thrown away; a complete-but-invalid
    /// schedule cannot seed anything and restarts clean.
    fn simulate_once(
        &self,
        inner: &Arc<ThreadPool>,
        failures: &AtomicU64,
        failure_seq: &AtomicU64,
        initial: Vec<Game>,
    ) -> Vec<Game> {
        let mut initial = initial;
        loop {
            let seed = ClockSeed::default().next_u64();
            let mut draw = Draw::new(
                Arc::clone(&self.roster),
                &initial,
                seed,
                Executor::Pool(Arc::clone(inner)),
            );
            match draw.run() {
                Ok(()) => match draw.verify() {
                    Ok(()) => return draw.schedule().to_vec(),
                    Err(error) => {
                        warn!("draw failed verification: {error}");
                        self.record_failure(draw.schedule(), failures, failure_seq);
                        initial.clear();
                    }
                },
                Err(error) => {
                    debug!(
                        "draw failed ({error}), retrying with {} fixtures preserved",
                        draw.schedule().len()
                    );
                    self.record_failure(draw.schedule(), failures, failure_seq);
                    initial = draw.schedule().to_vec();
                }
            }
        }
    }

    fn record_failure(&self, schedule: &[Game], failures: &AtomicU64, failure_seq: &AtomicU64) {
        failures.fetch_add(1, Ordering::Relaxed);
        if let Some(dir) = &self.config.failure_dir {
            let number = failure_seq.fetch_add(1, Ordering::Relaxed) + 1;
            let path = dir.join(format!("{number}.txt"));
            if let Err(error) = data::write_games_txt(&path, schedule, &self.roster) {
                warn!("could not dump failed draw {number}: {error}");
            }
        }
    }
}

/// Writes the aggregated counts: YAML frontmatter, a header, then one row per
/// unordered team pair with its home, away and total meeting counts.
pub fn write_results(
    path: &Path,
    roster: &Roster,
    competition: Competition,
    year: u32,
    iterations: u64,
    counts: &FxHashMap<(usize, usize), u64>,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let mut writer = CsvWriter::create(path)
        .with_context(|| format!("creating results file {}", path.display()))?;
    writer.line("---")?;
    writer.line(&format!(
        "timestamp: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ))?;
    writer.line(&format!("competition: {competition}"))?;
    writer.line(&format!("year: {year}"))?;
    writer.line(&format!("simulations: {iterations}"))?;
    writer.line("---")?;
    writer.append(["t1", "t2", "home", "away", "total"])?;
    for first in 0..roster.len() - 1 {
        for second in first + 1..roster.len() {
            let home = counts.get(&(first, second)).copied().unwrap_or(0);
            let away = counts.get(&(second, first)).copied().unwrap_or(0);
            writer.append([
                first.to_string(),
                second.to_string(),
                home.to_string(),
                away.to_string(),
                (home + away).to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}
