//! Stanza tables for pots, fixtures and the simulation summary.

use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};

use crate::domain::{Game, Roster};
use crate::state::DrawState;

/// A team's fixtures ordered by opponent pot, each tagged `h` or `a`.
fn fixture_cells(state: &DrawState, team: usize) -> Vec<String> {
    let roster = state.roster();
    let mut games = state.games_of(team).to_vec();
    games.sort_by_key(|game| roster.format.pot_of(game.opponent_of(team)));
    games
        .iter()
        .map(|game| {
            let opponent = game.opponent_of(team);
            let side = if game.home == team { 'h' } else { 'a' };
            format!("{}{side}", roster.abbrev(opponent))
        })
        .collect()
}

/// One table per pot listing each team and its drawn fixtures.
pub fn tabulate_pots(state: &DrawState) -> Vec<Table> {
    let roster = state.roster();
    let format = state.format();
    (1..=format.pots)
        .map(|pot| {
            let mut table = Table::default()
                .with_cols(vec![
                    Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Left)),
                    Col::new(Styles::default().with(HAlign::Left)),
                ])
                .with_row(Row::new(
                    Styles::default().with(Header(true)),
                    vec![format!("Pot {pot}").into(), "Fixtures".into()],
                ));
            table.push_rows(format.pot_teams(pot).map(|team| {
                Row::new(
                    Styles::default(),
                    vec![
                        roster.abbrev(team).to_string().into(),
                        fixture_cells(state, team).join(" ").into(),
                    ],
                )
            }));
            table
        })
        .collect()
}

/// The fixtures of a single drawn team, one row per opponent, ordered by
/// opponent pot. Used by the televised draw display.
pub fn tabulate_team(state: &DrawState, team: usize) -> Table {
    let roster = state.roster();
    let format = state.format();
    let mut games = state.games_of(team).to_vec();
    games.sort_by_key(|game| format.pot_of(game.opponent_of(team)));
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Left)),
            Col::new(Styles::default().with(HAlign::Left)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Pot".into(),
                format!("{} ({})", roster.abbrev(team), roster.team(team).country).into(),
                "Side".into(),
            ],
        ));
    table.push_rows(games.iter().map(|game| {
        let opponent = game.opponent_of(team);
        let side = if game.home == team { "home" } else { "away" };
        Row::new(
            Styles::default(),
            vec![
                format.pot_of(opponent).to_string().into(),
                roster.abbrev(opponent).to_string().into(),
                side.into(),
            ],
        )
    }));
    table
}

/// End-of-run summary for the simulator.
pub fn tabulate_summary(
    iterations: u64,
    failures: u64,
    mean_secs: f64,
    output: &str,
) -> Table {
    Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default(),
            vec!["Simulations".into(), iterations.to_string().into()],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec!["Failures".into(), failures.to_string().into()],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec!["Mean s/draw".into(), format!("{mean_secs:.3}").into()],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec!["Results".into(), output.to_string().into()],
        ))
}

/// A plain one-line rendering of a fixture.
pub fn display_game(roster: &Roster, game: Game) -> String {
    format!(
        "{}-{}\t{}-{}",
        roster.abbrev(game.home),
        roster.abbrev(game.away),
        roster.format.pot_of(game.home),
        roster.format.pot_of(game.away)
    )
}

#[cfg(test)]
mod tests {
    use stanza::renderer::console::Console;
    use stanza::renderer::Renderer;

    use super::*;
    use crate::domain::Game;
    use crate::state::DrawState;
    use crate::testing::mini_roster;

    #[test]
    fn pots_tables_cover_every_team() {
        let mut state = DrawState::new(mini_roster());
        state.commit(Game::new(0, 4));
        let tables = tabulate_pots(&state);
        assert_eq!(2, tables.len());
        let rendered: String = tables
            .iter()
            .map(|table| Console::default().render(table).to_string())
            .collect();
        for abbrev in ["AAA", "BBB", "GGG", "HHH"] {
            assert!(rendered.contains(abbrev), "missing {abbrev}");
        }
        assert!(rendered.contains("EEEh"));
    }

    #[test]
    fn team_table_tags_sides() {
        let mut state = DrawState::new(mini_roster());
        state.commit(Game::new(0, 4));
        state.commit(Game::new(5, 0));
        let rendered = Console::default()
            .render(&tabulate_team(&state, 0))
            .to_string();
        assert!(rendered.contains("EEE"));
        assert!(rendered.contains("home"));
        assert!(rendered.contains("FFF"));
        assert!(rendered.contains("away"));
    }

    #[test]
    fn game_display_shows_pots() {
        let state = DrawState::new(mini_roster());
        assert_eq!(
            "AAA-EEE\t1-2",
            display_game(state.roster(), Game::new(0, 4))
        );
    }
}
