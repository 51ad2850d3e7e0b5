use serde::{Deserialize, Serialize};

use crate::combos::ComboTable;
use crate::config::Roster;
use crate::pairs::PairTable;
use crate::ranking::{Band, RankingEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRow {
    pub pair: String,
    pub together_matches: usize,
    pub actual_win_rate: f64,
    pub expected_win_rate: f64,
    pub effect: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboRow {
    pub players: Vec<String>,
    pub size: usize,
    pub matches: usize,
    pub win_rate: f64,
    pub expected_win_rate: f64,
    pub synergy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub name: String,
    pub average_effect: f64,
    pub personal_win_rate: f64,
    pub matches: usize,
    pub band: Band,
}

/// Presentation-ready results. Rates and effects are percentages rounded to
/// one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub pairs: Vec<PairRow>,
    pub combos: Vec<ComboRow>,
    pub ranking: Vec<RankingRow>,
}

/// `fraction` as a percentage rounded to one decimal, ties to even.
pub fn percent(fraction: f64) -> f64 {
    round_tenth_half_even(fraction * 100.0)
}

/// Rounds to the nearest tenth, judging ties on the exact binary value of
/// `x` rather than on the rounded product `x * 10`.
fn round_tenth_half_even(x: f64) -> f64 {
    let scaled = x * 10.0;
    if !scaled.is_finite() {
        return x;
    }
    // exact: x * 10 == scaled + residual
    let residual = x.mul_add(10.0, -scaled);
    let lower = scaled.floor();
    let above_half = (scaled - lower) - 0.5;
    let round_up = if above_half != 0.0 {
        above_half > 0.0
    } else if residual != 0.0 {
        residual > 0.0
    } else {
        lower % 2.0 != 0.0
    };
    let rounded = if round_up { lower + 1.0 } else { lower };
    rounded / 10.0
}

pub fn pair_label(roster: &Roster, first: usize, second: usize) -> String {
    format!("{} + {}", roster.name(first), roster.name(second))
}

pub fn assemble_report(
    roster: &Roster,
    pairs: &PairTable,
    combos: &ComboTable,
    ranking: &[RankingEntry],
) -> Report {
    let pairs = pairs
        .records()
        .iter()
        .map(|r| PairRow {
            pair: pair_label(roster, r.first, r.second),
            together_matches: r.together_matches,
            actual_win_rate: percent(r.win_rate),
            expected_win_rate: percent(r.expected_win_rate),
            effect: percent(r.effect),
        })
        .collect();

    let combos = combos
        .records()
        .iter()
        .map(|r| ComboRow {
            players: r.members.iter().map(|&s| roster.name(s).to_string()).collect(),
            size: r.size(),
            matches: r.matches,
            win_rate: percent(r.win_rate),
            expected_win_rate: percent(r.expected_win_rate),
            synergy: percent(r.synergy),
        })
        .collect();

    let ranking = ranking
        .iter()
        .map(|e| RankingRow {
            name: roster.name(e.slot).to_string(),
            average_effect: percent(e.average_effect),
            personal_win_rate: percent(e.personal_win_rate),
            matches: e.matches,
            band: e.band,
        })
        .collect();

    Report {
        pairs,
        combos,
        ranking,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(0.75), 75.0);
        assert_eq!(percent(1.0 / 3.0), 33.3);
        assert_eq!(percent(-0.12345), -12.3);
        assert_eq!(percent(0.0), 0.0);
    }

    #[test]
    fn percent_breaks_exact_ties_to_even() {
        assert_eq!(percent(0.0625), 6.2);
        assert_eq!(percent(0.5625), 56.2);
        assert_eq!(percent(-0.0625), -6.2);
        assert_eq!(percent(9.0 / 16.0), 56.2);
        assert_eq!(percent(0.0375), 3.8);
        assert_eq!(percent(3.0 / 16.0), 18.8);
    }

    #[test]
    fn percent_rounds_inexact_halves_by_their_binary_value() {
        // 0.0015 * 100 is stored just below 0.15
        assert_eq!(percent(0.0015), 0.1);
        assert_eq!(percent(0.5), 50.0);
    }

    #[test]
    fn report_serializes_three_sections() {
        let report = Report {
            pairs: Vec::new(),
            combos: Vec::new(),
            ranking: vec![RankingRow {
                name: "Probe".into(),
                average_effect: -4.2,
                personal_win_rate: 51.0,
                matches: 20,
                band: Band::MildDrag,
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(json["ranking"][0]["band"], "mild_drag");
    }
}
