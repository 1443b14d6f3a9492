//! Shared fixtures for the unit tests.

use std::sync::Arc;

use crate::comp::{Competition, Format};
use crate::domain::{Roster, Team};

pub fn team(pot: usize, abbrev: &str, country: &str) -> Team {
    Team {
        pot,
        abbrev: abbrev.to_string(),
        country: country.to_string(),
        name: format!("{abbrev} FC"),
        coefficient: None,
    }
}

/// A small base-rules format: 2 pots of 4, each team playing 2 opponents per
/// pot, one home and one away.
pub fn mini_format() -> Format {
    Format {
        pots: 2,
        teams_per_pot: 4,
        games_per_team: 4,
        games_per_pot_pair: 4,
        paired_pots: false,
    }
}

pub fn mini_teams() -> Vec<Team> {
    let abbrevs = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH"];
    abbrevs
        .iter()
        .enumerate()
        .map(|(index, abbrev)| team(1 + index / 4, abbrev, &format!("C{index}")))
        .collect()
}

pub fn mini_roster() -> Arc<Roster> {
    Arc::new(Roster::new(mini_format(), mini_teams(), &[]).unwrap())
}

/// The smallest paired-pot format: one unit of two pots, each team playing one
/// opponent per pot, one home and one away within the unit.
pub fn paired_format() -> Format {
    Format {
        pots: 2,
        teams_per_pot: 2,
        games_per_team: 2,
        games_per_pot_pair: 1,
        paired_pots: true,
    }
}

pub fn paired_roster() -> Arc<Roster> {
    let teams = vec![
        team(1, "AAA", "C0"),
        team(1, "BBB", "C1"),
        team(2, "CCC", "C2"),
        team(2, "DDD", "C3"),
    ];
    Arc::new(Roster::new(paired_format(), teams, &[]).unwrap())
}

/// A full-size UCL roster: 36 synthetic teams where the first twelve share six
/// countries pairwise and the rest are sole representatives.
pub fn ucl_roster() -> Arc<Roster> {
    ucl_roster_with_banned(&[])
}

pub fn ucl_roster_with_banned(banned: &[(String, String)]) -> Arc<Roster> {
    let format = Competition::Ucl.format();
    let teams = (0..format.num_teams())
        .map(|index| {
            let country = if index < 12 {
                format!("D{}", index / 2)
            } else {
                format!("S{index}")
            };
            team(format.pot_of(index), &format!("T{index:02}"), &country)
        })
        .collect();
    Arc::new(Roster::new(format, teams, banned).unwrap())
}

/// A full-size UECL roster with 36 sole-representative countries.
pub fn uecl_roster() -> Arc<Roster> {
    let format = Competition::Uecl.format();
    let teams = (0..format.num_teams())
        .map(|index| team(format.pot_of(index), &format!("U{index:02}"), &format!("N{index}")))
        .collect();
    Arc::new(Roster::new(format, teams, &[]).unwrap())
}
