//! The mutable draw state: the candidate universe, the validity predicate and
//! the commit/revert bookkeeping every other component reads.
//!
//! Every keyed quantity lives in a flat vector indexed by small integers (team,
//! pot, interned country), so cloning a state for a DFS worker is a handful of
//! memcpys. Home/away *needs* are accounted per bucket: the pot itself under
//! base rules, the paired-pot unit under UECL rules.

use std::mem;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tinyrand::Rand;

use crate::comp::Format;
use crate::domain::{Game, Roster, Side};
use crate::shuffle::SliceExt;

#[derive(Clone, Debug, PartialEq)]
pub struct DrawState {
    pub(crate) roster: Arc<Roster>,
    pub(crate) format: Format,
    /// Committed fixtures, in commit order.
    pub(crate) picked: Vec<Game>,
    /// Remaining candidate fixtures, kept consistent with `picked` by
    /// [`DrawState::refilter`].
    pub(crate) all_games: Vec<Game>,
    pub(crate) picked_pairs: FxHashSet<(usize, usize)>,
    pub(crate) games_by_team: Vec<Vec<Game>>,
    /// Committed fixtures per directed (home pot, away pot) pair.
    pub(crate) pot_pair_games: Vec<u32>,
    pub(crate) home_games: Vec<u32>,
    pub(crate) away_games: Vec<u32>,
    /// Opponents faced per (team, country).
    pub(crate) opp_country: Vec<u32>,
    /// Whether a (team, pot, side) slot has been used.
    pub(crate) played_pot: Vec<bool>,
    /// Teams already presented by the televised draw loop.
    pub(crate) drawn_teams: FxHashSet<usize>,
    /// Per bucket, the teams still owing a home game against it.
    pub(crate) needs_home: Vec<FxHashSet<usize>>,
    pub(crate) needs_away: Vec<FxHashSet<usize>>,
    /// Home games still owed by each (country, bucket). Signed so that
    /// over-seeded states degrade into failed draws instead of panics.
    pub(crate) country_home_needs: Vec<i32>,
    pub(crate) country_away_needs: Vec<i32>,
}

impl DrawState {
    pub fn new(roster: Arc<Roster>) -> Self {
        let format = roster.format;
        let num_teams = format.num_teams();
        let buckets = format.buckets();
        let countries = roster.num_countries();

        let all_teams: FxHashSet<usize> = (0..num_teams).collect();
        let mut country_needs = vec![0; countries * buckets];
        for team in 0..num_teams {
            for bucket in 0..buckets {
                country_needs[roster.country_id(team) * buckets + bucket] += 1;
            }
        }

        let mut state = Self {
            format,
            picked: Vec::with_capacity(format.total_games()),
            all_games: Vec::new(),
            picked_pairs: FxHashSet::default(),
            games_by_team: vec![Vec::with_capacity(format.games_per_team); num_teams],
            pot_pair_games: vec![0; format.pots * format.pots],
            home_games: vec![0; num_teams],
            away_games: vec![0; num_teams],
            opp_country: vec![0; num_teams * countries],
            played_pot: vec![false; num_teams * format.pots * 2],
            drawn_teams: FxHashSet::default(),
            needs_home: vec![all_teams.clone(); buckets],
            needs_away: vec![all_teams; buckets],
            country_home_needs: country_needs.clone(),
            country_away_needs: country_needs,
            roster,
        };
        state.generate_all_games();
        state
    }

    /// A state with `initial` fixtures already on the board, committed
    /// verbatim, and the candidate universe filtered accordingly.
    pub fn with_initial(roster: Arc<Roster>, initial: &[Game]) -> Self {
        let mut state = Self::new(roster);
        for &game in initial {
            state.commit(game);
        }
        state.refilter();
        state
    }

    /// Materializes every directed pairing of teams from different,
    /// non-banned countries.
    fn generate_all_games(&mut self) {
        let num_teams = self.format.num_teams();
        for home in 0..num_teams - 1 {
            for away in home + 1..num_teams {
                if self.roster.pairable(home, away) {
                    self.all_games.push(Game::new(home, away));
                    self.all_games.push(Game::new(away, home));
                }
            }
        }
    }

    /// Whether `game` is locally legal against the current state. Same-country
    /// and banned pairings never enter the candidate universe, so they are not
    /// re-checked here.
    pub fn admits(&self, game: Game) -> bool {
        let (h, a) = (game.home, game.away);
        if self.picked_pairs.contains(&(h, a)) || self.picked_pairs.contains(&(a, h)) {
            return false;
        }
        let half = self.format.home_games_per_team() as u32;
        if self.home_games[h] >= half || self.away_games[a] >= half {
            return false;
        }
        let hp = self.format.pot_of(h);
        let ap = self.format.pot_of(a);
        if self.has_played(h, ap, Side::Home) || self.has_played(a, hp, Side::Away) {
            return false;
        }
        if self.opp_country_count(h, self.roster.country_id(a)) >= 2
            || self.opp_country_count(a, self.roster.country_id(h)) >= 2
        {
            return false;
        }
        if self.format.paired_pots {
            // One game per pot: the same pot may not be revisited on the other
            // side; one home and one away per unit: the paired pot may not
            // repeat the side.
            if self.has_played(h, ap, Side::Away)
                || self.has_played(a, hp, Side::Home)
                || self.has_played(h, self.format.paired_pot(ap), Side::Home)
                || self.has_played(a, self.format.paired_pot(hp), Side::Away)
            {
                return false;
            }
        }
        true
    }

    /// Applies every delta of accepting `game`. [`DrawState::revert`] is its
    /// exact inverse.
    pub fn commit(&mut self, game: Game) {
        let (h, a) = (game.home, game.away);
        let hp = self.format.pot_of(h);
        let ap = self.format.pot_of(a);
        let ch = self.roster.country_id(h);
        let ca = self.roster.country_id(a);
        let hb = self.format.bucket_of_pot(hp);
        let ab = self.format.bucket_of_pot(ap);
        let buckets = self.format.buckets();

        let pot_pair = self.pot_pair_index(hp, ap);
        let home_country = self.opp_index(h, ca);
        let away_country = self.opp_index(a, ch);
        let home_slot = self.played_index(h, ap, Side::Home);
        let away_slot = self.played_index(a, hp, Side::Away);

        self.picked.push(game);
        self.picked_pairs.insert((h, a));
        self.games_by_team[h].push(game);
        self.games_by_team[a].push(game);
        self.pot_pair_games[pot_pair] += 1;
        self.home_games[h] += 1;
        self.away_games[a] += 1;
        self.opp_country[home_country] += 1;
        self.opp_country[away_country] += 1;
        self.played_pot[home_slot] = true;
        self.played_pot[away_slot] = true;
        self.needs_home[ab].remove(&h);
        self.needs_away[hb].remove(&a);
        self.country_home_needs[ch * buckets + ab] -= 1;
        self.country_away_needs[ca * buckets + hb] -= 1;
    }

    pub fn revert(&mut self, game: Game) {
        let (h, a) = (game.home, game.away);
        let hp = self.format.pot_of(h);
        let ap = self.format.pot_of(a);
        let ch = self.roster.country_id(h);
        let ca = self.roster.country_id(a);
        let hb = self.format.bucket_of_pot(hp);
        let ab = self.format.bucket_of_pot(ap);
        let buckets = self.format.buckets();

        let pot_pair = self.pot_pair_index(hp, ap);
        let home_country = self.opp_index(h, ca);
        let away_country = self.opp_index(a, ch);
        let home_slot = self.played_index(h, ap, Side::Home);
        let away_slot = self.played_index(a, hp, Side::Away);

        if let Some(position) = self.picked.iter().rposition(|picked| *picked == game) {
            self.picked.remove(position);
        }
        self.picked_pairs.remove(&(h, a));
        for team in [h, a] {
            if let Some(position) = self.games_by_team[team]
                .iter()
                .rposition(|picked| *picked == game)
            {
                self.games_by_team[team].remove(position);
            }
        }
        self.pot_pair_games[pot_pair] -= 1;
        self.home_games[h] -= 1;
        self.away_games[a] -= 1;
        self.opp_country[home_country] -= 1;
        self.opp_country[away_country] -= 1;
        self.played_pot[home_slot] = false;
        self.played_pot[away_slot] = false;
        self.needs_home[ab].insert(h);
        self.needs_away[hb].insert(a);
        self.country_home_needs[ch * buckets + ab] += 1;
        self.country_away_needs[ca * buckets + hb] += 1;
    }

    /// Drops every remaining candidate the current state no longer admits.
    pub fn refilter(&mut self) {
        let mut games = mem::take(&mut self.all_games);
        games.retain(|&game| self.admits(game));
        self.all_games = games;
    }

    pub fn shuffle_remaining(&mut self, rand: &mut impl Rand) {
        self.all_games.shuffle(rand);
    }

    pub fn complete(&self) -> bool {
        self.picked.len() >= self.format.total_games()
    }

    pub fn picked(&self) -> &[Game] {
        &self.picked
    }

    pub fn remaining(&self) -> &[Game] {
        &self.all_games
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn games_of(&self, team: usize) -> &[Game] {
        &self.games_by_team[team]
    }

    pub fn remaining_games(&self, team: usize) -> u32 {
        (self.format.games_per_team as u32)
            .saturating_sub(self.home_games[team] + self.away_games[team])
    }

    pub fn has_played(&self, team: usize, pot: usize, side: Side) -> bool {
        self.played_pot[self.played_index(team, pot, side)]
    }

    pub fn opp_country_count(&self, team: usize, country: usize) -> u32 {
        self.opp_country[self.opp_index(team, country)]
    }

    pub fn pot_pair_count(&self, home_pot: usize, away_pot: usize) -> u32 {
        self.pot_pair_games[self.pot_pair_index(home_pot, away_pot)]
    }

    pub fn mark_drawn(&mut self, team: usize) {
        self.drawn_teams.insert(team);
    }

    pub fn is_drawn(&self, team: usize) -> bool {
        self.drawn_teams.contains(&team)
    }

    /// First directed pot pair, scanning row-major, that has not yet received
    /// its full allotment of fixtures.
    pub fn next_open_pot_pair(&self) -> Option<(usize, usize)> {
        let quota = self.format.games_per_pot_pair as u32;
        for home_pot in 1..=self.format.pots {
            for away_pot in 1..=self.format.pots {
                if self.pot_pair_count(home_pot, away_pot) < quota {
                    return Some((home_pot, away_pot));
                }
            }
        }
        None
    }

    /// Whether `team` may be selected as the next home side against `away_pot`.
    pub fn home_predicate(&self, team: usize, away_pot: usize) -> bool {
        if self.format.paired_pots {
            !self.has_played(team, away_pot, Side::Home)
                && !self.has_played(team, away_pot, Side::Away)
                && !self.has_played(team, self.format.paired_pot(away_pot), Side::Home)
        } else {
            !self.has_played(team, away_pot, Side::Home)
        }
    }

    /// The DFS's next variable: among `home_pot` teams passing the home-team
    /// predicate, the one whose country owes the fewest home games against the
    /// away bucket, ties broken by roster order.
    pub fn select_home_team(&self, home_pot: usize, away_pot: usize) -> Option<usize> {
        let bucket = self.format.bucket_of_pot(away_pot);
        let buckets = self.format.buckets();
        self.format
            .pot_teams(home_pot)
            .filter(|&team| self.home_predicate(team, away_pot))
            .min_by_key(|&team| {
                self.country_home_needs[self.roster.country_id(team) * buckets + bucket]
            })
    }

    pub fn country_home_need(&self, country: usize, bucket: usize) -> i32 {
        self.country_home_needs[country * self.format.buckets() + bucket]
    }

    pub fn country_away_need(&self, country: usize, bucket: usize) -> i32 {
        self.country_away_needs[country * self.format.buckets() + bucket]
    }

    fn pot_pair_index(&self, home_pot: usize, away_pot: usize) -> usize {
        (home_pot - 1) * self.format.pots + (away_pot - 1)
    }

    fn opp_index(&self, team: usize, country: usize) -> usize {
        team * self.roster.num_countries() + country
    }

    fn played_index(&self, team: usize, pot: usize, side: Side) -> usize {
        (team * self.format.pots + pot - 1) * 2 + side.index()
    }
}
