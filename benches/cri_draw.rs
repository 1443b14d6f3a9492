use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use criterion::{criterion_group, criterion_main, Criterion};

use swissdraw::comp::Competition;
use swissdraw::dfs::{dfs, SortMode};
use swissdraw::domain::{Game, Roster, Team};
use swissdraw::draw::Draw;
use swissdraw::search::Executor;
use swissdraw::state::DrawState;

fn ucl_roster() -> Arc<Roster> {
    let format = Competition::Ucl.format();
    let teams = (0..format.num_teams())
        .map(|index| Team {
            pot: format.pot_of(index),
            abbrev: format!("T{index:02}"),
            country: if index < 12 {
                format!("D{}", index / 2)
            } else {
                format!("S{index}")
            },
            name: format!("Team {index}"),
            coefficient: None,
        })
        .collect();
    Arc::new(Roster::new(format, teams, &[]).unwrap())
}

fn criterion_benchmark(c: &mut Criterion) {
    let roster = ucl_roster();

    // sanity check
    let mut draw = Draw::new(Arc::clone(&roster), &[], 1, Executor::Inline);
    draw.run().unwrap();
    draw.verify().unwrap();

    c.bench_function("cri_dfs_opening_proof", |b| {
        let state = DrawState::new(Arc::clone(&roster));
        let stop = AtomicBool::new(false);
        let remaining = state.remaining().to_vec();
        b.iter(|| {
            let mut ctx = state.clone();
            dfs(
                &mut ctx,
                Game::new(0, 9),
                &remaining,
                SortMode::BigCountries,
                false,
                &stop,
            )
        });
    });

    c.bench_function("cri_draw_ucl", |b| {
        let mut seed = 0;
        b.iter(|| {
            seed += 1;
            let mut draw = Draw::new(Arc::clone(&roster), &[], seed, Executor::Inline);
            draw.run().unwrap();
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
