//! Teams, fixtures and the immutable roster a draw runs over.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::comp::Format;
use crate::lookup::Lookup;

/// A club taking part in the league phase. Teams are listed in pot order, so a
/// team's position in the roster determines its pot.
#[derive(Clone, Debug, PartialEq)]
pub struct Team {
    /// 1-based pot the team is seeded into.
    pub pot: usize,
    /// Short unique abbreviation, e.g. `RMA`.
    pub abbrev: String,
    /// Country code, e.g. `ESP`.
    pub country: String,
    pub name: String,
    pub coefficient: Option<f64>,
}

/// A directed fixture: `home` hosts `away`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Game {
    pub home: usize,
    pub away: usize,
}

impl Game {
    pub fn new(home: usize, away: usize) -> Self {
        Self { home, away }
    }

    pub fn reverse(&self) -> Game {
        Game::new(self.away, self.home)
    }

    pub fn involves(&self, team: usize) -> bool {
        self.home == team || self.away == team
    }

    pub fn opponent_of(&self, team: usize) -> usize {
        if self.home == team {
            self.away
        } else {
            self.home
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("expected {expected} teams, read {actual}")]
    WrongTeamCount { expected: usize, actual: usize },

    #[error("team {abbrev} declares pot {declared} but is positioned in pot {positioned}")]
    OutOfPotOrder {
        abbrev: String,
        declared: usize,
        positioned: usize,
    },

    #[error("duplicate team abbreviation {0}")]
    DuplicateAbbrev(String),
}

/// The immutable inputs of a draw: the pot-ordered teams, interned countries,
/// and the banned country pairings. Shared across DFS workers behind an `Arc`.
#[derive(Debug, PartialEq)]
pub struct Roster {
    pub format: Format,
    teams: Vec<Team>,
    abbrevs: Lookup<String>,
    countries: Lookup<String>,
    country_of: Vec<usize>,
    teams_by_country: Vec<Vec<usize>>,
    banned: FxHashSet<(usize, usize)>,
}

impl Roster {
    /// Builds a roster, validating the team list against the format. Banned
    /// pairs naming countries absent from the roster are vacuous and dropped.
    pub fn new(
        format: Format,
        teams: Vec<Team>,
        banned_pairs: &[(String, String)],
    ) -> Result<Self, RosterError> {
        if teams.len() != format.num_teams() {
            return Err(RosterError::WrongTeamCount {
                expected: format.num_teams(),
                actual: teams.len(),
            });
        }

        let mut abbrevs = Lookup::new();
        let mut countries = Lookup::new();
        let mut country_of = Vec::with_capacity(teams.len());
        for (index, team) in teams.iter().enumerate() {
            let positioned = format.pot_of(index);
            if team.pot != positioned {
                return Err(RosterError::OutOfPotOrder {
                    abbrev: team.abbrev.clone(),
                    declared: team.pot,
                    positioned,
                });
            }
            if abbrevs.index_of(&team.abbrev).is_some() {
                return Err(RosterError::DuplicateAbbrev(team.abbrev.clone()));
            }
            abbrevs.intern(team.abbrev.clone());
            country_of.push(countries.intern(team.country.clone()));
        }

        let mut teams_by_country = vec![Vec::new(); countries.len()];
        for (team, &country) in country_of.iter().enumerate() {
            teams_by_country[country].push(team);
        }

        let mut banned = FxHashSet::default();
        for (first, second) in banned_pairs {
            if let (Some(c1), Some(c2)) = (countries.index_of(first), countries.index_of(second)) {
                banned.insert((c1.min(c2), c1.max(c2)));
            }
        }

        Ok(Self {
            format,
            teams,
            abbrevs,
            countries,
            country_of,
            teams_by_country,
            banned,
        })
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, index: usize) -> &Team {
        &self.teams[index]
    }

    pub fn abbrev(&self, index: usize) -> &str {
        &self.teams[index].abbrev
    }

    pub fn team_by_abbrev(&self, abbrev: &str) -> Option<usize> {
        self.abbrevs.index_of(&abbrev.to_string())
    }

    pub fn num_countries(&self) -> usize {
        self.countries.len()
    }

    pub fn country_id(&self, team: usize) -> usize {
        self.country_of[team]
    }

    pub fn country_name(&self, country: usize) -> &str {
        &self.countries[country]
    }

    /// Teams registered to `country`.
    pub fn country_teams(&self, country: usize) -> &[usize] {
        &self.teams_by_country[country]
    }

    /// Size of the away team's country, the primary key of candidate ordering.
    pub fn country_size_of(&self, team: usize) -> usize {
        self.teams_by_country[self.country_of[team]].len()
    }

    pub fn banned(&self, c1: usize, c2: usize) -> bool {
        self.banned.contains(&(c1.min(c2), c1.max(c2)))
    }

    /// Whether two teams may be drawn against each other at all: distinct
    /// clubs, distinct countries, and no banned pairing.
    pub fn pairable(&self, first: usize, second: usize) -> bool {
        let c1 = self.country_of[first];
        let c2 = self.country_of[second];
        first != second && c1 != c2 && !self.banned(c1, c2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mini_format, mini_teams};

    #[test]
    fn roster_rejects_wrong_count() {
        let mut teams = mini_teams();
        teams.pop();
        let err = Roster::new(mini_format(), teams, &[]).unwrap_err();
        assert_eq!(
            RosterError::WrongTeamCount {
                expected: 8,
                actual: 7
            },
            err
        );
    }

    #[test]
    fn roster_rejects_out_of_pot_order() {
        let mut teams = mini_teams();
        teams[0].pot = 2;
        let err = Roster::new(mini_format(), teams, &[]).unwrap_err();
        assert_eq!(
            RosterError::OutOfPotOrder {
                abbrev: "AAA".into(),
                declared: 2,
                positioned: 1
            },
            err
        );
    }

    #[test]
    fn roster_rejects_duplicate_abbrev() {
        let mut teams = mini_teams();
        teams[1].abbrev = "AAA".into();
        let err = Roster::new(mini_format(), teams, &[]).unwrap_err();
        assert_eq!(RosterError::DuplicateAbbrev("AAA".into()), err);
    }

    #[test]
    fn banned_pairs_are_unordered() {
        let roster = Roster::new(
            mini_format(),
            mini_teams(),
            &[("C7".to_string(), "C0".to_string())],
        )
        .unwrap();
        let c0 = roster.country_id(0);
        let c7 = roster.country_id(7);
        assert!(roster.banned(c0, c7));
        assert!(roster.banned(c7, c0));
        assert!(!roster.pairable(0, 7));
        assert!(roster.pairable(0, 6));
    }

    #[test]
    fn pairable_rejects_same_country() {
        let mut teams = mini_teams();
        teams[1].country = "C0".into();
        let roster = Roster::new(mini_format(), teams, &[]).unwrap();
        assert!(!roster.pairable(0, 1));
        assert!(!roster.pairable(3, 3));
        assert_eq!(2, roster.country_size_of(0));
        assert_eq!(&[0, 1], roster.country_teams(roster.country_id(0)));
    }
}
