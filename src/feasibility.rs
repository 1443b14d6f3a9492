//! Residual feasibility checks used to prune dead DFS branches: a cheap
//! partner-exists check run on every frame, and a costlier country
//! demand/supply check enabled once a candidate has already timed out.

use crate::domain::Game;
use crate::state::DrawState;

impl DrawState {
    /// Whether the directed pairing `home` hosts `away` is still open:
    /// the clubs may meet at all and the state admits the fixture.
    fn pairing_open(&self, home: usize, away: usize) -> bool {
        self.roster.pairable(home, away) && self.admits(Game::new(home, away))
    }

    /// Weak check, run after `game` was committed. Every team still owing an
    /// away fixture against the home side's bucket must have a legal host left
    /// there, and every team owing a home fixture against the away side's
    /// bucket must have a legal visitor left there. Only the two buckets the
    /// commit tightened are scanned.
    pub fn partners_remain(&self, game: Game) -> bool {
        let home_bucket = self.format.bucket_of_pot(self.format.pot_of(game.home));
        let away_bucket = self.format.bucket_of_pot(self.format.pot_of(game.away));

        for &team in &self.needs_away[home_bucket] {
            if !self
                .format
                .bucket_teams(home_bucket)
                .any(|host| self.pairing_open(host, team))
            {
                return false;
            }
        }
        for &team in &self.needs_home[away_bucket] {
            if !self
                .format
                .bucket_teams(away_bucket)
                .any(|visitor| self.pairing_open(team, visitor))
            {
                return false;
            }
        }
        true
    }

    /// Strong check: for every (country, bucket), the fixtures still owed by
    /// the country's teams against the bucket must not exceed a conservative
    /// upper bound on what the bucket can still absorb.
    pub fn country_supply_holds(&self) -> bool {
        let buckets = self.format.buckets();
        for country in 0..self.roster.num_countries() {
            for bucket in 0..buckets {
                let home_demand = self.country_home_needs[country * buckets + bucket];
                if home_demand > 0 && !self.home_supply_at_least(country, bucket, home_demand) {
                    return false;
                }
                let away_demand = self.country_away_needs[country * buckets + bucket];
                if away_demand > 0 && !self.away_supply_at_least(country, bucket, away_demand) {
                    return false;
                }
            }
        }
        true
    }

    /// Can the bucket's teams still absorb `demand` visits from the country's
    /// teams? Each potential opponent contributes the number of open hosts,
    /// clipped to its remaining same-country allowance.
    fn home_supply_at_least(&self, country: usize, bucket: usize, demand: i32) -> bool {
        let mut supply = 0;
        for opponent in self.format.bucket_teams(bucket) {
            let cap = 2 - self.opp_country_count(opponent, country) as i32;
            if cap <= 0 {
                continue;
            }
            let hosts = self
                .roster
                .country_teams(country)
                .iter()
                .filter(|&&host| self.pairing_open(host, opponent))
                .count() as i32;
            supply += hosts.min(cap);
            if supply >= demand {
                return true;
            }
        }
        false
    }

    fn away_supply_at_least(&self, country: usize, bucket: usize, demand: i32) -> bool {
        let mut supply = 0;
        for opponent in self.format.bucket_teams(bucket) {
            let cap = 2 - self.opp_country_count(opponent, country) as i32;
            if cap <= 0 {
                continue;
            }
            let visitors = self
                .roster
                .country_teams(country)
                .iter()
                .filter(|&&visitor| self.pairing_open(opponent, visitor))
                .count() as i32;
            supply += visitors.min(cap);
            if supply >= demand {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::domain::{Game, Roster};
    use crate::state::DrawState;
    use crate::testing::{mini_format, mini_teams, paired_roster};

    /// Teams 3 (pot 1) and 7 (pot 2) share a country.
    fn wedge_roster() -> Arc<Roster> {
        let mut teams = mini_teams();
        teams[3].country = "W".to_string();
        teams[7].country = "W".to_string();
        Arc::new(Roster::new(mini_format(), teams, &[]).unwrap())
    }

    #[test]
    fn partners_remain_on_a_fresh_commit() {
        let mut state = DrawState::new(wedge_roster());
        let game = Game::new(0, 4);
        state.commit(game);
        assert!(state.partners_remain(game));
    }

    #[test]
    fn partners_remain_detects_a_stranded_team() {
        let mut state = DrawState::new(wedge_roster());
        // pot 1's home-against-pot-2 slots go to 4, 5 and 6; team 7 can only
        // visit team 3, its compatriot
        for game in [Game::new(0, 4), Game::new(1, 5)] {
            state.commit(game);
            assert!(state.partners_remain(game));
        }
        let fatal = Game::new(2, 6);
        state.commit(fatal);
        assert!(!state.partners_remain(fatal));
    }

    #[test]
    fn country_supply_holds_on_a_fresh_state() {
        let state = DrawState::new(wedge_roster());
        assert!(state.country_supply_holds());
    }

    #[test]
    fn country_supply_detects_overdemand() {
        let mut state = DrawState::new(wedge_roster());
        // burn every pot-2 away-against-pot-2 slot except team 7's; both
        // country-W teams still owe a home fixture against pot 2, but 7 cannot
        // host itself and 3 cannot host 7
        for game in [Game::new(4, 5), Game::new(5, 6), Game::new(6, 4)] {
            state.commit(game);
        }
        let w = state.roster().country_id(3);
        assert_eq!(2, state.country_home_need(w, 1));
        assert!(!state.country_supply_holds());
    }

    #[test]
    fn paired_checks_span_the_unit() {
        let mut state = DrawState::new(paired_roster());
        let game = Game::new(0, 2);
        state.commit(game);
        // team 0 still owes an away fixture within the unit and can visit
        // either pot of it
        assert!(state.partners_remain(game));
        assert!(state.country_supply_holds());
    }
}
