//! The draw driver: repeatedly proves and commits fixtures until the
//! schedule is complete.

use std::sync::Arc;

use thiserror::Error;
use tinyrand::{Seeded, StdRand};
use tracing::debug;

use crate::domain::{Game, Roster};
use crate::search::{Executor, Search};
use crate::shuffle::rand_index;
use crate::state::DrawState;
use crate::verify::{self, VerifyError};

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    /// The per-candidate deadline elapsed even under strong pruning. The
    /// simulator treats this as recoverable and retries with the committed
    /// fixtures preserved.
    #[error("feasibility search timed out")]
    Timeout,

    /// Every remaining candidate was refuted while the schedule is still
    /// incomplete; the state admits no completion.
    #[error("no candidate fixture extends the current schedule")]
    Exhausted,
}

pub struct Draw {
    state: DrawState,
    rand: StdRand,
    search: Search,
}

impl Draw {
    /// A draw over `roster` with `initial` fixtures pre-committed verbatim.
    /// Each draw owns its PRNG; the caller supplies the seed.
    pub fn new(roster: Arc<Roster>, initial: &[Game], seed: u64, executor: Executor) -> Self {
        Self {
            state: DrawState::with_initial(roster, initial),
            rand: StdRand::seed(seed),
            search: Search::new(executor),
        }
    }

    /// Runs the draw to completion.
    pub fn run(&mut self) -> Result<(), DrawError> {
        while !self.state.complete() {
            self.step()?;
        }
        Ok(())
    }

    /// Shuffles, proves and commits one fixture.
    fn step(&mut self) -> Result<Game, DrawError> {
        self.state.shuffle_remaining(&mut self.rand);
        let game = self.search.pick_game(&self.state)?;
        self.state.commit(game);
        self.state.refilter();
        debug!(
            "committed {}-{} ({} of {})",
            self.state.roster().abbrev(game.home),
            self.state.roster().abbrev(game.away),
            self.state.picked().len(),
            self.state.format().total_games()
        );
        Ok(game)
    }

    /// Runs the draw in the televised order: pot by pot, one randomly drawn
    /// team at a time, completing the drawn team's schedule before moving on.
    /// `on_team` observes each drawn team before its missing fixtures are
    /// picked; `on_game` observes every new fixture involving it. The order
    /// of committed fixtures changes, their distribution does not: the search
    /// still picks globally.
    pub fn run_televised(
        &mut self,
        mut on_team: impl FnMut(usize, &DrawState),
        mut on_game: impl FnMut(Game, &DrawState),
    ) -> Result<(), DrawError> {
        let format = self.state.format();
        for pot in 1..=format.pots {
            for _ in 0..format.teams_per_pot {
                let team = self.draw_team(pot);
                on_team(team, &self.state);
                while self.state.games_of(team).len() < format.games_per_team {
                    let game = self.step()?;
                    if game.involves(team) {
                        on_game(game, &self.state);
                    }
                }
            }
        }
        Ok(())
    }

    /// Randomly draws one not-yet-drawn team from `pot`.
    fn draw_team(&mut self, pot: usize) -> usize {
        let undrawn: Vec<usize> = self
            .state
            .format()
            .pot_teams(pot)
            .filter(|&team| !self.state.is_drawn(team))
            .collect();
        let team = undrawn[rand_index(&mut self.rand, undrawn.len())];
        self.state.mark_drawn(team);
        team
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn schedule(&self) -> &[Game] {
        self.state.picked()
    }

    /// Re-derives every constraint from the schedule alone.
    pub fn verify(&self) -> Result<(), VerifyError> {
        verify::verify(self.state.roster(), self.state.picked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Roster;
    use crate::testing::{
        mini_roster, mini_teams, paired_roster, ucl_roster, ucl_roster_with_banned, uecl_roster,
    };

    #[test]
    fn mini_draw_completes_and_verifies() {
        let mut draw = Draw::new(mini_roster(), &[], 42, Executor::Inline);
        draw.run().unwrap();
        assert_eq!(16, draw.schedule().len());
        draw.verify().unwrap();
    }

    #[test]
    fn equal_seeds_reproduce_the_schedule() {
        let mut first = Draw::new(mini_roster(), &[], 7, Executor::Inline);
        let mut second = Draw::new(mini_roster(), &[], 7, Executor::Inline);
        first.run().unwrap();
        second.run().unwrap();
        assert_eq!(first.schedule(), second.schedule());
    }

    #[test]
    fn seeded_fixtures_survive_verbatim() {
        let seed = Game::new(0, 4);
        let mut draw = Draw::new(mini_roster(), &[seed], 3, Executor::Inline);
        draw.run().unwrap();
        assert!(draw.schedule().contains(&seed));
        assert_eq!(seed, draw.schedule()[0]);
        draw.verify().unwrap();
    }

    #[test]
    fn nonsense_seed_fails_without_panicking() {
        let seed = Game::new(0, 4);
        let mut draw = Draw::new(mini_roster(), &[seed, seed], 3, Executor::Inline);
        assert_eq!(Err(DrawError::Exhausted), draw.run());
    }

    #[test]
    fn same_country_seed_is_caught_by_the_verifier() {
        let mut teams = mini_teams();
        teams[4].country = "C0".to_string();
        let roster =
            std::sync::Arc::new(Roster::new(crate::testing::mini_format(), teams, &[]).unwrap());
        // 0 vs 4 could never be drawn, but a seed bypasses the universe
        let mut draw = Draw::new(roster, &[Game::new(0, 4)], 9, Executor::Inline);
        if draw.run().is_ok() {
            assert!(draw.verify().is_err());
        }
    }

    #[test]
    fn televised_draw_presents_each_team_once_in_pot_order() {
        let mut draw = Draw::new(mini_roster(), &[], 21, Executor::Inline);
        let mut presented = Vec::new();
        draw.run_televised(
            |team, state| presented.push((state.format().pot_of(team), team)),
            |_, _| {},
        )
        .unwrap();
        assert_eq!(8, presented.len());
        let pots: Vec<usize> = presented.iter().map(|(pot, _)| *pot).collect();
        let mut sorted = pots.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, pots);
        let mut teams: Vec<usize> = presented.iter().map(|(_, team)| *team).collect();
        teams.sort_unstable();
        assert_eq!((0..8).collect::<Vec<_>>(), teams);
        draw.verify().unwrap();
    }

    #[test]
    fn paired_draw_completes_and_verifies() {
        let mut draw = Draw::new(paired_roster(), &[], 5, Executor::Inline);
        draw.run().unwrap();
        assert_eq!(4, draw.schedule().len());
        draw.verify().unwrap();
    }

    #[test]
    fn full_ucl_draw_completes_and_verifies() {
        let mut draw = Draw::new(ucl_roster(), &[], 1234, Executor::Inline);
        draw.run().unwrap();
        assert_eq!(144, draw.schedule().len());
        draw.verify().unwrap();
    }

    #[test]
    fn full_uecl_draw_completes_and_verifies() {
        let mut draw = Draw::new(uecl_roster(), &[], 4321, Executor::Inline);
        draw.run().unwrap();
        assert_eq!(108, draw.schedule().len());
        draw.verify().unwrap();
    }

    #[test]
    fn banned_pairing_never_appears() {
        let roster = ucl_roster_with_banned(&[("D0".to_string(), "D1".to_string())]);
        let mut draw = Draw::new(Arc::clone(&roster), &[], 99, Executor::Inline);
        draw.run().unwrap();
        draw.verify().unwrap();
        for game in draw.schedule() {
            let c1 = roster.country_name(roster.country_id(game.home)).to_string();
            let c2 = roster.country_name(roster.country_id(game.away)).to_string();
            assert!(
                !(c1 == "D0" && c2 == "D1") && !(c1 == "D1" && c2 == "D0"),
                "banned pairing drawn: {game:?}"
            );
        }
    }
}
