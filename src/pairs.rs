use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::SampleGates;
use crate::index::{MatchIndex, PlayerHistory};

#[derive(Debug, Clone, PartialEq)]
pub struct PairRecord {
    /// Lower roster slot of the pair.
    pub first: usize,
    pub second: usize,
    pub first_win_rate: f64,
    pub second_win_rate: f64,
    pub together_matches: usize,
    pub together_wins: usize,
    pub win_rate: f64,
    pub expected_win_rate: f64,
    pub effect: f64,
}

impl PairRecord {
    pub fn involves(&self, slot: usize) -> bool {
        self.first == slot || self.second == slot
    }

    pub fn partner_of(&self, slot: usize) -> Option<usize> {
        if self.first == slot {
            Some(self.second)
        } else if self.second == slot {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Pair records ordered by effect (highest first), addressable by either
/// orientation of the pair.
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    records: Vec<PairRecord>,
    lookup: HashMap<(usize, usize), usize>,
}

impl PairTable {
    /// Sorts by effect descending; equal effects keep the given order.
    pub fn from_records(mut records: Vec<PairRecord>) -> Self {
        records.sort_by(|a, b| b.effect.partial_cmp(&a.effect).unwrap_or(Ordering::Equal));
        let lookup = records
            .iter()
            .enumerate()
            .map(|(pos, r)| (pair_key(r.first, r.second), pos))
            .collect();
        Self { records, lookup }
    }

    pub fn records(&self) -> &[PairRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, a: usize, b: usize) -> Option<&PairRecord> {
        self.lookup.get(&pair_key(a, b)).map(|&pos| &self.records[pos])
    }

    pub fn involving(&self, slot: usize) -> impl Iterator<Item = &PairRecord> {
        self.records.iter().filter(move |r| r.involves(slot))
    }
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Matches where both players appear on the same team, and how many of
/// those were won.
pub fn together_counts(a: &PlayerHistory, b: &PlayerHistory) -> (usize, usize) {
    let mut total = 0usize;
    let mut wins = 0usize;
    for entry in b.first_appearances() {
        let Some(mine) = a.get(&entry.match_id) else {
            continue;
        };
        if mine.team_id != entry.team_id {
            continue;
        }
        total += 1;
        if mine.is_win {
            wins += 1;
        }
    }
    (total, wins)
}

pub fn analyze_pairs(index: &MatchIndex, gates: &SampleGates) -> PairTable {
    let n = index.roster().len();
    let baselines = index.baselines();
    let mut records = Vec::new();

    for first in 0..n {
        for second in (first + 1)..n {
            let (together, wins) = together_counts(index.history(first), index.history(second));
            if together < gates.min_pair_matches {
                continue;
            }
            let first_win_rate = baselines.win_rate(first);
            let second_win_rate = baselines.win_rate(second);
            let win_rate = wins as f64 / together as f64;
            let expected_win_rate = (first_win_rate + second_win_rate) / 2.0;
            records.push(PairRecord {
                first,
                second,
                first_win_rate,
                second_win_rate,
                together_matches: together,
                together_wins: wins,
                win_rate,
                expected_win_rate,
                effect: win_rate - expected_win_rate,
            });
        }
    }

    PairTable::from_records(records)
}
