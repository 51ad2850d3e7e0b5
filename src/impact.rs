use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::SampleGates;
use crate::index::{MatchIndex, PlayerHistory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Neutral,
    Low,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Neutral => "neutral",
            Confidence::Low => "low",
        }
    }
}

pub fn classify_confidence(with_matches: usize, without_matches: usize, gates: &SampleGates) -> Confidence {
    if with_matches >= gates.high_confidence_matches
        && without_matches >= gates.high_confidence_matches
    {
        Confidence::High
    } else if with_matches < gates.low_confidence_below
        || without_matches < gates.low_confidence_below
    {
        Confidence::Low
    } else {
        Confidence::Neutral
    }
}

/// How one teammate fares with the subject on their team versus without.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactComparison {
    pub teammate: usize,
    pub with_matches: usize,
    pub with_wins: usize,
    pub with_win_rate: f64,
    pub without_matches: usize,
    pub without_wins: usize,
    pub without_win_rate: f64,
    pub delta: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectImpact {
    pub subject: usize,
    /// Highest delta first.
    pub comparisons: Vec<ImpactComparison>,
    pub mean_delta: f64,
}

/// Splits the teammate's matches by whether the subject was on their side.
/// "Without" includes matches where the subject played for the other team.
pub fn compare(
    subject: &PlayerHistory,
    teammate_slot: usize,
    teammate: &PlayerHistory,
    gates: &SampleGates,
) -> Option<ImpactComparison> {
    let (mut with_matches, mut with_wins) = (0usize, 0usize);
    let (mut without_matches, mut without_wins) = (0usize, 0usize);

    for entry in teammate.matches() {
        if subject.same_team_as(entry) {
            with_matches += 1;
            if entry.is_win {
                with_wins += 1;
            }
        } else {
            without_matches += 1;
            if entry.is_win {
                without_wins += 1;
            }
        }
    }

    if with_matches < gates.min_impact_matches || without_matches < gates.min_impact_matches {
        return None;
    }

    let with_win_rate = with_wins as f64 / with_matches as f64;
    let without_win_rate = without_wins as f64 / without_matches as f64;
    Some(ImpactComparison {
        teammate: teammate_slot,
        with_matches,
        with_wins,
        with_win_rate,
        without_matches,
        without_wins,
        without_win_rate,
        delta: with_win_rate - without_win_rate,
        confidence: classify_confidence(with_matches, without_matches, gates),
    })
}

pub fn analyze_subject(index: &MatchIndex, subject: usize, gates: &SampleGates) -> Option<SubjectImpact> {
    let history = index.history(subject);
    let mut comparisons: Vec<ImpactComparison> = (0..index.roster().len())
        .filter(|&other| other != subject)
        .filter_map(|other| compare(history, other, index.history(other), gates))
        .collect();
    if comparisons.is_empty() {
        return None;
    }

    let mean_delta = comparisons.iter().map(|c| c.delta).sum::<f64>() / comparisons.len() as f64;
    comparisons.sort_by(|a, b| b.delta.partial_cmp(&a.delta).unwrap_or(Ordering::Equal));
    Some(SubjectImpact {
        subject,
        comparisons,
        mean_delta,
    })
}

/// Subjects in roster order; subjects with no qualifying comparison are left out.
pub fn analyze_impacts(index: &MatchIndex, gates: &SampleGates) -> Vec<SubjectImpact> {
    (0..index.roster().len())
        .filter_map(|subject| analyze_subject(index, subject, gates))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Roster, TrackedPlayer};
    use crate::dataset::ParticipationRecord;

    fn rec(match_id: String, player_id: &str, team_id: i64, is_win: bool) -> ParticipationRecord {
        ParticipationRecord {
            match_id,
            player_id: player_id.into(),
            team_id,
            is_win,
            rating_delta: if is_win { 1.0 } else { -1.0 },
        }
    }

    fn roster() -> Roster {
        Roster::new(vec![TrackedPlayer::new("x", "X"), TrackedPlayer::new("y", "Y")]).unwrap()
    }

    #[test]
    fn confidence_bands() {
        let gates = SampleGates::default();
        assert_eq!(classify_confidence(8, 8, &gates), Confidence::High);
        assert_eq!(classify_confidence(8, 7, &gates), Confidence::Neutral);
        assert_eq!(classify_confidence(5, 30, &gates), Confidence::Neutral);
        assert_eq!(classify_confidence(4, 30, &gates), Confidence::Low);
        assert_eq!(classify_confidence(30, 2, &gates), Confidence::Low);
    }

    #[test]
    fn opponent_appearances_count_as_without() {
        let mut records = Vec::new();
        for i in 0..3 {
            let id = format!("w{i}");
            records.push(rec(id.clone(), "x", 0, true));
            records.push(rec(id, "y", 0, true));
        }
        for i in 0..2 {
            let id = format!("o{i}");
            records.push(rec(id.clone(), "x", 1, true));
            records.push(rec(id, "y", 0, false));
        }
        let index = MatchIndex::build(roster(), &records);
        let cmp = compare(index.history(0), 1, index.history(1), &SampleGates::default())
            .expect("both partitions have enough matches");
        assert_eq!((cmp.with_matches, cmp.with_wins), (3, 3));
        assert_eq!((cmp.without_matches, cmp.without_wins), (2, 0));
        assert_eq!(cmp.delta, 1.0);
        assert_eq!(cmp.confidence, Confidence::Low);
    }

    #[test]
    fn thin_partition_skips_comparison() {
        let mut records = Vec::new();
        for i in 0..5 {
            let id = format!("m{i}");
            records.push(rec(id.clone(), "y", 0, i % 2 == 0));
            if i == 0 {
                records.push(rec(id, "x", 0, true));
            }
        }
        let index = MatchIndex::build(roster(), &records);
        assert!(analyze_subject(&index, 0, &SampleGates::default()).is_none());
        assert!(analyze_impacts(&index, &SampleGates::default()).is_empty());
    }
}
