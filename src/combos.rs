use std::cmp::Ordering;

use crate::config::SampleGates;
use crate::index::MatchIndex;

pub const MIN_COMBO_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ComboRecord {
    /// Roster slots in ascending order.
    pub members: Vec<usize>,
    pub matches: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub expected_win_rate: f64,
    pub synergy: f64,
}

impl ComboRecord {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ComboHeadlines<'a> {
    pub best_synergy: &'a ComboRecord,
    pub worst_synergy: &'a ComboRecord,
    pub highest_win_rate: &'a ComboRecord,
}

/// Combo records grouped by size (ascending), synergy descending within a size.
#[derive(Debug, Clone, Default)]
pub struct ComboTable {
    records: Vec<ComboRecord>,
}

impl ComboTable {
    pub fn from_records(mut records: Vec<ComboRecord>) -> Self {
        records.sort_by(|a, b| {
            a.size()
                .cmp(&b.size())
                .then_with(|| b.synergy.partial_cmp(&a.synergy).unwrap_or(Ordering::Equal))
        });
        Self { records }
    }

    pub fn records(&self) -> &[ComboRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn of_size(&self, size: usize) -> impl Iterator<Item = &ComboRecord> {
        self.records.iter().filter(move |r| r.size() == size)
    }

    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.records.iter().map(ComboRecord::size).collect();
        sizes.dedup();
        sizes
    }

    /// Ties go to the combo enumerated first: smaller size, then
    /// lexicographic members.
    pub fn headlines(&self) -> Option<ComboHeadlines<'_>> {
        let mut enumerated: Vec<&ComboRecord> = self.records.iter().collect();
        enumerated.sort_by(|a, b| a.size().cmp(&b.size()).then_with(|| a.members.cmp(&b.members)));
        let (&first, rest) = enumerated.split_first()?;
        let mut best = first;
        let mut worst = first;
        let mut highest = first;
        for &r in rest {
            if r.synergy > best.synergy {
                best = r;
            }
            if r.synergy < worst.synergy {
                worst = r;
            }
            if r.win_rate > highest.win_rate {
                highest = r;
            }
        }
        Some(ComboHeadlines {
            best_synergy: best,
            worst_synergy: worst,
            highest_win_rate: highest,
        })
    }
}

/// All `k`-element subsets of `0..n` in lexicographic order.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k == 0 || k > n {
        return out;
    }
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        out.push(current.clone());
        let mut i = k;
        while i > 0 && current[i - 1] == n - k + (i - 1) {
            i -= 1;
        }
        if i == 0 {
            break;
        }
        current[i - 1] += 1;
        for j in i..k {
            current[j] = current[j - 1] + 1;
        }
    }
    out
}

/// Matches where every member played on one shared team, and how many of
/// them were won.
pub fn shared_team_counts(index: &MatchIndex, members: &[usize]) -> (usize, usize) {
    let Some((&lead, rest)) = members.split_first() else {
        return (0, 0);
    };
    let mut total = 0usize;
    let mut wins = 0usize;
    'matches: for entry in index.history(lead).first_appearances() {
        for &slot in rest {
            match index.history(slot).get(&entry.match_id) {
                Some(other) if other.team_id == entry.team_id => {}
                _ => continue 'matches,
            }
        }
        total += 1;
        if entry.is_win {
            wins += 1;
        }
    }
    (total, wins)
}

pub fn analyze_combos(index: &MatchIndex, gates: &SampleGates) -> ComboTable {
    let n = index.roster().len();
    let baselines = index.baselines();
    let mut records = Vec::new();

    for size in MIN_COMBO_SIZE..=n {
        for members in combinations(n, size) {
            let (matches, wins) = shared_team_counts(index, &members);
            if matches < gates.min_combo_matches {
                continue;
            }
            let win_rate = wins as f64 / matches as f64;
            let expected_win_rate = baselines.mean_win_rate(&members);
            records.push(ComboRecord {
                members,
                matches,
                wins,
                win_rate,
                expected_win_rate,
                synergy: win_rate - expected_win_rate,
            });
        }
    }

    ComboTable::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Roster, TrackedPlayer};
    use crate::dataset::ParticipationRecord;

    #[test]
    fn combinations_are_lexicographic() {
        assert_eq!(
            combinations(4, 3),
            vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 2, 3], vec![1, 2, 3]]
        );
        assert_eq!(combinations(6, 3).len(), 20);
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
    }

    fn rec(match_id: &str, player_id: &str, team_id: i64, is_win: bool) -> ParticipationRecord {
        ParticipationRecord {
            match_id: match_id.into(),
            player_id: player_id.into(),
            team_id,
            is_win,
            rating_delta: if is_win { 1.0 } else { -1.0 },
        }
    }

    fn roster(ids: &[&str]) -> Roster {
        Roster::new(ids.iter().map(|id| TrackedPlayer::new(*id, id.to_uppercase())).collect()).unwrap()
    }

    #[test]
    fn split_team_matches_do_not_qualify() {
        let mut records = Vec::new();
        for m in ["m1", "m2", "m3"] {
            records.push(rec(m, "a", 0, true));
            records.push(rec(m, "b", 0, true));
            records.push(rec(m, "c", 0, true));
        }
        records.push(rec("m4", "a", 0, true));
        records.push(rec("m4", "b", 0, true));
        records.push(rec("m4", "c", 1, false));

        let index = MatchIndex::build(roster(&["a", "b", "c"]), &records);
        assert_eq!(shared_team_counts(&index, &[0, 1, 2]), (3, 3));

        let table = analyze_combos(&index, &SampleGates::default());
        assert_eq!(table.len(), 1);
        let combo = &table.records()[0];
        assert_eq!(combo.matches, 3);
        assert_eq!(combo.win_rate, 1.0);
        assert_eq!(combo.synergy, combo.win_rate - combo.expected_win_rate);
    }

    #[test]
    fn below_gate_is_omitted() {
        let mut records = Vec::new();
        for m in ["m1", "m2"] {
            for p in ["a", "b", "c"] {
                records.push(rec(m, p, 0, false));
            }
        }
        let index = MatchIndex::build(roster(&["a", "b", "c"]), &records);
        assert!(analyze_combos(&index, &SampleGates::default()).is_empty());
    }

    #[test]
    fn grouped_by_size_then_synergy() {
        let mk = |members: Vec<usize>, synergy: f64, win_rate: f64| ComboRecord {
            members,
            matches: 3,
            wins: 1,
            win_rate,
            expected_win_rate: win_rate - synergy,
            synergy,
        };
        let table = ComboTable::from_records(vec![
            mk(vec![0, 1, 2, 3], 0.4, 0.9),
            mk(vec![0, 1, 2], -0.1, 0.3),
            mk(vec![0, 1, 3], 0.2, 0.6),
            mk(vec![1, 2, 3], -0.3, 0.2),
        ]);
        let synergies: Vec<f64> = table.records().iter().map(|r| r.synergy).collect();
        assert_eq!(synergies, vec![0.2, -0.1, -0.3, 0.4]);
        assert_eq!(table.sizes(), vec![3, 4]);
        assert_eq!(table.of_size(3).count(), 3);

        let headlines = table.headlines().expect("non-empty table");
        assert_eq!(headlines.best_synergy.members, vec![0, 1, 2, 3]);
        assert_eq!(headlines.worst_synergy.members, vec![1, 2, 3]);
        assert_eq!(headlines.highest_win_rate.members, vec![0, 1, 2, 3]);
    }

    #[test]
    fn headline_ties_go_to_first_enumerated_combo() {
        let mk = |members: Vec<usize>, synergy: f64, win_rate: f64| ComboRecord {
            members,
            matches: 4,
            wins: 2,
            win_rate,
            expected_win_rate: win_rate - synergy,
            synergy,
        };
        // table order puts [1,2,3] ahead of [0,1,3] by synergy
        let table = ComboTable::from_records(vec![
            mk(vec![0, 1, 2], -0.2, 0.5),
            mk(vec![0, 1, 3], 0.1, 0.75),
            mk(vec![1, 2, 3], 0.3, 0.75),
            mk(vec![0, 2, 3], -0.2, 0.25),
            mk(vec![0, 1, 2, 3], 0.3, 0.5),
        ]);
        assert_eq!(table.records()[0].members, vec![1, 2, 3]);

        let headlines = table.headlines().expect("non-empty table");
        assert_eq!(headlines.highest_win_rate.members, vec![0, 1, 3]);
        assert_eq!(headlines.best_synergy.members, vec![1, 2, 3]);
        assert_eq!(headlines.worst_synergy.members, vec![0, 1, 2]);
    }

    #[test]
    fn repeated_lead_appearance_counts_match_once() {
        let mut records = Vec::new();
        for m in ["m1", "m2", "m3"] {
            records.push(rec(m, "a", 0, true));
            records.push(rec(m, "b", 0, true));
            records.push(rec(m, "c", 0, true));
        }
        records.push(rec("m3", "a", 0, true));

        let index = MatchIndex::build(roster(&["a", "b", "c"]), &records);
        assert_eq!(index.history(0).len(), 4);
        assert_eq!(shared_team_counts(&index, &[0, 1, 2]), (3, 3));
    }
}
