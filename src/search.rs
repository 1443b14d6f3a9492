//! Racing candidate proofs across parallel workers with cooperative
//! cancellation. One worker gets a fast deadline on its own; if it blows
//! through that, two more join in with different candidate orderings until
//! the hard deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rayon::ThreadPool;

use crate::dfs::{dfs, SortMode};
use crate::domain::Game;
use crate::draw::DrawError;
use crate::state::DrawState;

/// How long the first worker runs alone.
pub const FAST_DEADLINE: Duration = Duration::from_millis(250);
/// Hard per-candidate deadline, measured from the first worker's start.
pub const FULL_DEADLINE: Duration = Duration::from_millis(2500);

/// Where DFS workers run.
#[derive(Clone)]
pub enum Executor {
    /// On the caller's thread, deadline-free. Deterministic; pins the search
    /// to a single-threaded schedule for tests and benchmarks.
    Inline,
    /// On freshly spawned OS threads. Self-contained; the debug single-draw
    /// mode uses this.
    Threads,
    /// On a shared pool sized for every concurrent simulation's workers.
    Pool(Arc<ThreadPool>),
}

impl Executor {
    fn submit(&self, task: impl FnOnce() + Send + 'static) {
        match self {
            Executor::Inline => task(),
            Executor::Threads => {
                thread::spawn(task);
            }
            Executor::Pool(pool) => pool.spawn(task),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verdict {
    Proven,
    Refuted,
    TimedOut,
}

pub struct Search {
    executor: Executor,
    fast: Duration,
    full: Duration,
}

impl Search {
    pub fn new(executor: Executor) -> Self {
        Self {
            executor,
            fast: FAST_DEADLINE,
            full: FULL_DEADLINE,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_deadlines(executor: Executor, fast: Duration, full: Duration) -> Self {
        Self {
            executor,
            fast,
            full,
        }
    }

    /// Finds one candidate fixture that provably extends to a full draw.
    /// Candidates are tried lowest pots first; a candidate that times out
    /// under weak pruning is retried once with strong pruning before the
    /// whole pick is abandoned.
    pub fn pick_game(&self, state: &DrawState) -> Result<Game, DrawError> {
        let format = state.format();
        let mut candidates = state.remaining().to_vec();
        candidates.sort_by_key(|game| (format.pot_of(game.home), format.pot_of(game.away)));

        for game in candidates {
            match self.test_candidate(state, game, false) {
                Verdict::Proven => return Ok(game),
                Verdict::Refuted => continue,
                Verdict::TimedOut => match self.test_candidate(state, game, true) {
                    Verdict::Proven => return Ok(game),
                    Verdict::Refuted => continue,
                    Verdict::TimedOut => return Err(DrawError::Timeout),
                },
            }
        }
        Err(DrawError::Exhausted)
    }

    /// Races up to three DFS workers over one candidate. The first worker to
    /// publish through the CAS slot decides; deadline expiry makes the caller
    /// the CAS winner instead, locking every late worker out.
    fn test_candidate(&self, state: &DrawState, game: Game, strong: bool) -> Verdict {
        if let Executor::Inline = self.executor {
            let stop = AtomicBool::new(false);
            let mut ctx = state.clone();
            let remaining = ctx.remaining().to_vec();
            return if dfs(&mut ctx, game, &remaining, SortMode::BigCountries, strong, &stop) {
                Verdict::Proven
            } else {
                Verdict::Refuted
            };
        }

        let start = Instant::now();
        let stop = Arc::new(AtomicBool::new(false));
        let published = Arc::new(AtomicBool::new(false));
        let (result_tx, result_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let spawn = |mode: SortMode| {
            self.spawn_worker(state, game, mode, strong, &stop, &published, &result_tx, &done_tx)
        };

        spawn(SortMode::BigCountries);
        let received = match result_rx.recv_timeout(self.fast) {
            Ok(proven) => Some(proven),
            Err(_) => {
                spawn(SortMode::SmallCountries);
                spawn(SortMode::MostRemaining);
                let left = self.full.saturating_sub(start.elapsed());
                result_rx.recv_timeout(left).ok()
            }
        };

        let verdict = match received {
            Some(proven) => {
                stop.store(true, Ordering::Relaxed);
                if proven {
                    Verdict::Proven
                } else {
                    Verdict::Refuted
                }
            }
            None => {
                if published
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
                    .is_ok()
                {
                    stop.store(true, Ordering::Relaxed);
                    Verdict::TimedOut
                } else {
                    // a worker won the slot right at the bell; take its result
                    stop.store(true, Ordering::Relaxed);
                    match result_rx.recv() {
                        Ok(true) => Verdict::Proven,
                        Ok(false) => Verdict::Refuted,
                        Err(_) => Verdict::TimedOut,
                    }
                }
            }
        };

        // Join: every worker owns a clone of done_tx; the channel disconnects
        // once the last one exits.
        drop(done_tx);
        while done_rx.recv().is_ok() {}
        verdict
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_worker(
        &self,
        state: &DrawState,
        game: Game,
        mode: SortMode,
        strong: bool,
        stop: &Arc<AtomicBool>,
        published: &Arc<AtomicBool>,
        result_tx: &Sender<bool>,
        done_tx: &Sender<()>,
    ) {
        let mut ctx = state.clone();
        let stop = Arc::clone(stop);
        let published = Arc::clone(published);
        let result_tx = result_tx.clone();
        let done_tx = done_tx.clone();
        self.executor.submit(move || {
            let _done = done_tx;
            let remaining = ctx.remaining().to_vec();
            let proven = dfs(&mut ctx, game, &remaining, mode, strong, &stop);
            if published
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                let _ = result_tx.send(proven);
                stop.store(true, Ordering::Relaxed);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DrawState;
    use crate::testing::{mini_roster, ucl_roster};

    #[test]
    fn inline_pick_is_deterministic() {
        let state = DrawState::new(mini_roster());
        let search = Search::new(Executor::Inline);
        let first = search.pick_game(&state).unwrap();
        let second = search.pick_game(&state).unwrap();
        assert_eq!(first, second);
        assert!(state.admits(first));
        // candidates are tried lowest pots first
        assert_eq!(1, state.format().pot_of(first.home));
        assert_eq!(1, state.format().pot_of(first.away));
    }

    #[test]
    fn threaded_pick_returns_a_provable_game() {
        let state = DrawState::new(mini_roster());
        let search = Search::new(Executor::Threads);
        let game = search.pick_game(&state).unwrap();
        assert!(state.admits(game));
    }

    #[test]
    fn pooled_pick_returns_a_provable_game() {
        let pool = Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(3)
                .build()
                .unwrap(),
        );
        let state = DrawState::new(mini_roster());
        let search = Search::new(Executor::Pool(pool));
        let game = search.pick_game(&state).unwrap();
        assert!(state.admits(game));
    }

    #[test]
    fn zero_deadlines_time_the_pick_out() {
        // a full-size state cannot be proven in zero time, so both the weak
        // and the strong attempt expire and the pick is abandoned
        let state = DrawState::new(ucl_roster());
        let search =
            Search::with_deadlines(Executor::Threads, Duration::ZERO, Duration::ZERO);
        assert_eq!(Err(DrawError::Timeout), search.pick_game(&state));
    }
}
