use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use squad_synergy::combos::analyze_combos;
use squad_synergy::config::{Roster, SampleGates, SynergyConfig, TrackedPlayer};
use squad_synergy::dataset::ParticipationRecord;
use squad_synergy::engine::SynergyEngine;
use squad_synergy::index::MatchIndex;

const TRACKED: [&str; 6] = ["17366", "16589", "160368", "209525", "7720", "194698"];

fn roster() -> Vec<TrackedPlayer> {
    TRACKED
        .iter()
        .enumerate()
        .map(|(i, id)| TrackedPlayer::new(*id, format!("Player {}", i + 1)))
        .collect()
}

/// Deterministic 10-seat matches; tracked players rotate through both teams.
fn sample_records(matches: usize) -> Vec<ParticipationRecord> {
    let mut out = Vec::with_capacity(matches * 10);
    for m in 0..matches {
        let match_id = format!("m{m}");
        let winner = (m % 3 == 0) as i64;
        for seat in 0..10usize {
            let player_id = if seat < TRACKED.len() && (m + seat) % 4 != 0 {
                TRACKED[seat].to_string()
            } else {
                format!("anon{m}-{seat}")
            };
            let team_id = ((seat + m / 2) % 2) as i64;
            let rating_delta = if team_id == winner { 12.0 } else { -12.0 };
            out.push(ParticipationRecord {
                match_id: match_id.clone(),
                player_id,
                team_id,
                is_win: seat % 2 == 0,
                rating_delta,
            });
        }
    }
    out
}

fn bench_full_pipeline(c: &mut Criterion) {
    let engine = SynergyEngine::new(SynergyConfig::new(roster())).expect("valid roster");
    let records = sample_records(500);
    c.bench_function("full_pipeline_500_matches", |b| {
        b.iter(|| {
            let mut batch = records.clone();
            let analysis = engine.run(black_box(&mut batch)).unwrap();
            black_box(analysis.report.pairs.len());
        })
    });
}

fn bench_combo_enumeration(c: &mut Criterion) {
    let records = sample_records(500);
    let index = MatchIndex::build(Roster::new(roster()).unwrap(), &records);
    let gates = SampleGates::default();
    c.bench_function("combo_enumeration_6_players", |b| {
        b.iter(|| {
            let table = analyze_combos(black_box(&index), &gates);
            black_box(table.len());
        })
    });
}

criterion_group!(benches, bench_full_pipeline, bench_combo_enumeration);
criterion_main!(benches);
