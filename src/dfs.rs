//! The backtracking feasibility prover: decides whether a candidate fixture
//! can be part of some completion of the current schedule.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::Game;
use crate::state::DrawState;

/// Candidate orderings used to diversify racing workers. All are stable, so
/// the pre-shuffle of the remaining games supplies the tie randomization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortMode {
    /// Away teams from the biggest countries first (they constrain the draw
    /// the most), then away teams with the most unscheduled fixtures.
    BigCountries,
    /// Away teams from the smallest countries first, then most unscheduled.
    SmallCountries,
    /// Away teams with the most unscheduled fixtures only.
    MostRemaining,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [
        SortMode::BigCountries,
        SortMode::SmallCountries,
        SortMode::MostRemaining,
    ];
}

pub fn order_candidates(state: &DrawState, candidates: &mut [Game], mode: SortMode) {
    let roster = state.roster();
    candidates.sort_by(|g1, g2| {
        let primary = match mode {
            SortMode::BigCountries => roster
                .country_size_of(g2.away)
                .cmp(&roster.country_size_of(g1.away)),
            SortMode::SmallCountries => roster
                .country_size_of(g1.away)
                .cmp(&roster.country_size_of(g2.away)),
            SortMode::MostRemaining => CmpOrdering::Equal,
        };
        primary.then_with(|| {
            state
                .remaining_games(g2.away)
                .cmp(&state.remaining_games(g1.away))
        })
    });
}

/// Returns true iff `game` can be accepted as part of some completion of
/// `state`, or the stop flag fired (by convention indistinguishable from an
/// accept; a stopped worker's verdict is never observed). The state is left
/// exactly as it was on entry.
pub fn dfs(
    state: &mut DrawState,
    game: Game,
    remaining: &[Game],
    mode: SortMode,
    strong: bool,
    stop: &AtomicBool,
) -> bool {
    if stop.load(Ordering::Relaxed) {
        return true;
    }
    if !state.admits(game) {
        return false;
    }
    state.commit(game);
    if state.complete() {
        state.revert(game);
        return true;
    }
    if !state.partners_remain(game) {
        state.revert(game);
        return false;
    }
    if strong && !state.country_supply_holds() {
        state.revert(game);
        return false;
    }

    let filtered: Vec<Game> = remaining
        .iter()
        .copied()
        .filter(|&candidate| state.admits(candidate))
        .collect();

    let next = state
        .next_open_pot_pair()
        .and_then(|(home_pot, away_pot)| {
            state
                .select_home_team(home_pot, away_pot)
                .map(|home| (home, away_pot))
        });
    let Some((home, away_pot)) = next else {
        state.revert(game);
        return false;
    };

    let mut candidates = filtered.clone();
    order_candidates(state, &mut candidates, mode);

    let format = state.format();
    for candidate in candidates {
        if candidate.home == home
            && format.pot_of(candidate.away) == away_pot
            && dfs(state, candidate, &filtered, mode, strong, stop)
        {
            state.revert(game);
            return true;
        }
    }

    state.revert(game);
    false
}
