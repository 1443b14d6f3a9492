//! Loaders for the draw's external inputs — teams, seeded fixtures, banned
//! country pairs — and writers for fixture dumps.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::Local;

use crate::comp::Competition;
use crate::csv::CsvReader;
use crate::domain::{Game, Roster, Team};

/// Reads a teams CSV: a header row, then `pot,abbrev,country,name[,coefficient]`
/// rows in pot order.
pub fn read_teams_csv(path: impl AsRef<Path>) -> anyhow::Result<Vec<Team>> {
    let path = path.as_ref();
    let reader = CsvReader::open(path)
        .with_context(|| format!("opening teams file {}", path.display()))?;
    parse_teams(reader).with_context(|| format!("parsing teams file {}", path.display()))
}

pub fn parse_teams<R: BufRead>(reader: CsvReader<R>) -> anyhow::Result<Vec<Team>> {
    let mut teams = Vec::new();
    for (number, record) in reader.enumerate() {
        let record = record?;
        if number == 0 {
            continue; // header row
        }
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() < 4 {
            bail!(
                "row {} has {} fields, expected pot,abbrev,country,name[,coefficient]",
                number + 1,
                record.len()
            );
        }
        let pot = record[0]
            .trim()
            .parse::<usize>()
            .with_context(|| format!("row {}: bad pot {:?}", number + 1, record[0]))?;
        let coefficient = match record.get(4).map(|field| field.trim()) {
            Some(field) if !field.is_empty() => Some(
                field
                    .parse::<f64>()
                    .with_context(|| format!("row {}: bad coefficient {field:?}", number + 1))?,
            ),
            _ => None,
        };
        teams.push(Team {
            pot,
            abbrev: record[1].trim().to_string(),
            country: record[2].trim().to_string(),
            name: record[3].trim().to_string(),
            coefficient,
        });
    }
    Ok(teams)
}

/// Reads seeded fixtures: one `HOME-AWAY` abbreviation pair per non-blank line.
pub fn read_initial_games(path: impl AsRef<Path>, roster: &Roster) -> anyhow::Result<Vec<Game>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("opening initial games file {}", path.display()))?;
    parse_initial_games(&text, roster)
        .with_context(|| format!("parsing initial games file {}", path.display()))
}

pub fn parse_initial_games(text: &str, roster: &Roster) -> anyhow::Result<Vec<Game>> {
    let mut games = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((home, away)) = line.split_once('-') else {
            bail!("malformed fixture {line:?}, expected HOME-AWAY");
        };
        let home = resolve_abbrev(roster, home.trim())?;
        let away = resolve_abbrev(roster, away.trim())?;
        games.push(Game::new(home, away));
    }
    Ok(games)
}

fn resolve_abbrev(roster: &Roster, abbrev: &str) -> anyhow::Result<usize> {
    match roster.team_by_abbrev(abbrev) {
        Some(team) => Ok(team),
        None => bail!("unknown team abbreviation {abbrev:?}"),
    }
}

/// Reads banned country pairs: one `COUNTRY1-COUNTRY2` per non-blank line,
/// order within a line irrelevant. A missing file means no bans.
pub fn read_banned_pairs(path: impl AsRef<Path>) -> anyhow::Result<Vec<(String, String)>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("opening banned pairs file {}", path.display()))?;
    let mut pairs = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((first, second)) = line.split_once('-') else {
            bail!(
                "malformed banned pair {line:?} in {}, expected COUNTRY1-COUNTRY2",
                path.display()
            );
        };
        pairs.push((first.trim().to_string(), second.trim().to_string()));
    }
    Ok(pairs)
}

/// Dumps a (possibly partial) schedule in the initial-games format, so a
/// failure can be replayed through the debug driver.
pub fn write_games_txt(
    path: impl AsRef<Path>,
    games: &[Game],
    roster: &Roster,
) -> Result<(), io::Error> {
    let mut out = fs::File::create(path)?;
    for game in games {
        writeln!(out, "{}-{}", roster.abbrev(game.home), roster.abbrev(game.away))?;
    }
    Ok(())
}

pub fn default_teams_path(year: u32, competition: Competition) -> PathBuf {
    ["data", &year.to_string(), &competition.to_string(), "teams.csv"]
        .iter()
        .collect()
}

pub fn default_banned_path(year: u32) -> PathBuf {
    ["data", &year.to_string(), "banned.txt"].iter().collect()
}

pub fn default_results_path(year: u32, competition: Competition, iterations: u64) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from("results").join(format!("{competition}_{year}_{iterations}_{stamp}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mini_roster;

    const TEAMS: &str = "\
pot,abbrev,country,name,coefficient
1,MCI,ENG,Manchester City,148.0
1,RMA,ESP,Real Madrid,136.0
2,ARS,ENG,Arsenal,
";

    #[test]
    fn parses_teams_with_optional_coefficient() {
        let teams = parse_teams(CsvReader::from_reader(TEAMS.as_bytes())).unwrap();
        assert_eq!(3, teams.len());
        assert_eq!("MCI", teams[0].abbrev);
        assert_eq!(Some(148.0), teams[0].coefficient);
        assert_eq!("ESP", teams[1].country);
        assert_eq!(2, teams[2].pot);
        assert_eq!(None, teams[2].coefficient);
    }

    #[test]
    fn rejects_short_rows() {
        let err = parse_teams(CsvReader::from_reader("h\n1,MCI,ENG".as_bytes())).unwrap_err();
        assert!(err.to_string().contains("expected pot,abbrev,country,name"));
    }

    #[test]
    fn rejects_bad_pot() {
        let csv = "pot,abbrev,country,name\none,MCI,ENG,Manchester City";
        assert!(parse_teams(CsvReader::from_reader(csv.as_bytes())).is_err());
    }

    #[test]
    fn parses_initial_games() {
        let roster = mini_roster();
        let games = parse_initial_games("AAA-EEE\n\n  BBB - FFF \n", &roster).unwrap();
        assert_eq!(vec![Game::new(0, 4), Game::new(1, 5)], games);
    }

    #[test]
    fn rejects_unknown_abbreviation() {
        let roster = mini_roster();
        let err = parse_initial_games("AAA-ZZZ", &roster).unwrap_err();
        assert!(err.to_string().contains("ZZZ"));
    }

    #[test]
    fn missing_banned_file_means_no_bans() {
        let pairs = read_banned_pairs("no/such/file.txt").unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn games_txt_round_trip() {
        let roster = mini_roster();
        let dir = std::env::temp_dir().join("swissdraw-data-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("games.txt");
        let games = vec![Game::new(0, 4), Game::new(5, 1)];
        write_games_txt(&path, &games, &roster).unwrap();
        let read_back = read_initial_games(&path, &roster).unwrap();
        assert_eq!(games, read_back);
    }

    #[test]
    fn default_paths() {
        assert_eq!(
            PathBuf::from("data/2024/ucl/teams.csv"),
            default_teams_path(2024, Competition::Ucl)
        );
        assert_eq!(
            PathBuf::from("data/2024/banned.txt"),
            default_banned_path(2024)
        );
        let results = default_results_path(2024, Competition::Uecl, 5000);
        assert!(results.to_string_lossy().starts_with("results/uecl_2024_5000_"));
    }
}
