//! Independent verification of completed draws. Everything is re-derived from
//! the schedule alone, so a bookkeeping bug in the engine cannot vouch for
//! itself.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::domain::{Game, Roster};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("drew {actual} fixtures but expected {expected}")]
    WrongGameCount { expected: usize, actual: usize },

    #[error("{home} and {away} are both registered in {country}")]
    SameCountry {
        home: String,
        away: String,
        country: String,
    },

    #[error("{home} vs {away} crosses the banned pairing {first}-{second}")]
    BannedPairing {
        home: String,
        away: String,
        first: String,
        second: String,
    },

    #[error("{team} faces more than two opponents from {country}")]
    CountryLimit { team: String, country: String },

    #[error("{home} vs {away} repeats a home or away slot within a pot group")]
    RepeatedSlot { home: String, away: String },

    #[error("{team} was drawn against {actual} distinct opponents, expected {expected}")]
    WrongOpponentCount {
        team: String,
        expected: usize,
        actual: usize,
    },

    #[error("{team} was drawn against {actual} clubs from pot {pot}, expected {expected}")]
    WrongPotCount {
        team: String,
        pot: usize,
        expected: usize,
        actual: usize,
    },
}

/// Checks a completed schedule: game count, no same-country or banned
/// pairings, the per-country opponent cap, one home and one away per pot
/// group (the pot itself under base rules, the paired-pot unit under UECL),
/// and the per-pot opponent quota. The first violation is returned.
pub fn verify(roster: &Roster, schedule: &[Game]) -> Result<(), VerifyError> {
    let format = roster.format;
    if schedule.len() != format.total_games() {
        return Err(VerifyError::WrongGameCount {
            expected: format.total_games(),
            actual: schedule.len(),
        });
    }

    let num_teams = format.num_teams();
    let buckets = format.buckets();
    let mut opponents: Vec<FxHashSet<usize>> = vec![FxHashSet::default(); num_teams];
    let mut per_pot = vec![0u32; num_teams * format.pots];
    let mut per_country = vec![0u32; num_teams * roster.num_countries()];
    let mut slots = vec![false; num_teams * buckets * 2];

    for &game in schedule {
        let (h, a) = (game.home, game.away);
        let ch = roster.country_id(h);
        let ca = roster.country_id(a);
        if ch == ca {
            return Err(VerifyError::SameCountry {
                home: roster.abbrev(h).to_string(),
                away: roster.abbrev(a).to_string(),
                country: roster.country_name(ch).to_string(),
            });
        }
        if roster.banned(ch, ca) {
            return Err(VerifyError::BannedPairing {
                home: roster.abbrev(h).to_string(),
                away: roster.abbrev(a).to_string(),
                first: roster.country_name(ch).to_string(),
                second: roster.country_name(ca).to_string(),
            });
        }

        let hp = format.pot_of(h);
        let ap = format.pot_of(a);
        opponents[h].insert(a);
        opponents[a].insert(h);
        per_pot[h * format.pots + ap - 1] += 1;
        per_pot[a * format.pots + hp - 1] += 1;

        per_country[h * roster.num_countries() + ca] += 1;
        if per_country[h * roster.num_countries() + ca] > 2 {
            return Err(VerifyError::CountryLimit {
                team: roster.abbrev(h).to_string(),
                country: roster.country_name(ca).to_string(),
            });
        }
        per_country[a * roster.num_countries() + ch] += 1;
        if per_country[a * roster.num_countries() + ch] > 2 {
            return Err(VerifyError::CountryLimit {
                team: roster.abbrev(a).to_string(),
                country: roster.country_name(ch).to_string(),
            });
        }

        let home_slot = (h * buckets + format.bucket_of_pot(ap)) * 2;
        let away_slot = (a * buckets + format.bucket_of_pot(hp)) * 2 + 1;
        if slots[home_slot] || slots[away_slot] {
            return Err(VerifyError::RepeatedSlot {
                home: roster.abbrev(h).to_string(),
                away: roster.abbrev(a).to_string(),
            });
        }
        slots[home_slot] = true;
        slots[away_slot] = true;
    }

    let expected_per_pot = format.opponents_per_pot();
    for team in 0..num_teams {
        if opponents[team].len() != format.games_per_team {
            return Err(VerifyError::WrongOpponentCount {
                team: roster.abbrev(team).to_string(),
                expected: format.games_per_team,
                actual: opponents[team].len(),
            });
        }
        for pot in 1..=format.pots {
            let actual = per_pot[team * format.pots + pot - 1] as usize;
            if actual != expected_per_pot {
                return Err(VerifyError::WrongPotCount {
                    team: roster.abbrev(team).to_string(),
                    pot,
                    expected: expected_per_pot,
                    actual,
                });
            }
        }
    }
    Ok(())
}
