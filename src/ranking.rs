use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynergyError};
use crate::index::BaselineTable;
use crate::pairs::PairTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Booster,
    Neutral,
    MildDrag,
    HeavyDrag,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Band::Booster => "booster",
            Band::Neutral => "neutral",
            Band::MildDrag => "mild drag",
            Band::HeavyDrag => "heavy drag",
        }
    }
}

/// Lower bounds (inclusive) of each band on the average pair effect.
/// Anything below `mild_drag` is a heavy drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub booster: f64,
    pub neutral: f64,
    pub mild_drag: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            booster: 0.05,
            neutral: -0.03,
            mild_drag: -0.10,
        }
    }
}

impl BandThresholds {
    pub fn validate(&self) -> Result<()> {
        let ordered = self.booster >= self.neutral && self.neutral >= self.mild_drag;
        let finite = [self.booster, self.neutral, self.mild_drag]
            .iter()
            .all(|v| v.is_finite());
        if ordered && finite {
            Ok(())
        } else {
            Err(SynergyError::InvalidConfig(format!(
                "band thresholds must be finite and descending, got booster={} neutral={} mild_drag={}",
                self.booster, self.neutral, self.mild_drag
            )))
        }
    }

    pub fn classify(&self, average_effect: f64) -> Band {
        if average_effect >= self.booster {
            Band::Booster
        } else if average_effect >= self.neutral {
            Band::Neutral
        } else if average_effect >= self.mild_drag {
            Band::MildDrag
        } else {
            Band::HeavyDrag
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub slot: usize,
    /// Mean pair effect over every qualifying pair with this player; 0 with none.
    pub average_effect: f64,
    pub pair_count: usize,
    pub personal_win_rate: f64,
    pub matches: usize,
    pub band: Band,
}

/// Drag/boost index: biggest drag first.
pub fn rank_players(
    player_count: usize,
    pairs: &PairTable,
    baselines: &BaselineTable,
    bands: &BandThresholds,
) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = (0..player_count)
        .map(|slot| {
            let (sum, count) = pairs
                .involving(slot)
                .fold((0.0, 0usize), |(sum, count), r| (sum + r.effect, count + 1));
            let average_effect = if count > 0 { sum / count as f64 } else { 0.0 };
            let baseline = baselines.get(slot);
            RankingEntry {
                slot,
                average_effect,
                pair_count: count,
                personal_win_rate: baseline.win_rate,
                matches: baseline.matches,
                band: bands.classify(average_effect),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.average_effect
            .partial_cmp(&b.average_effect)
            .unwrap_or(Ordering::Equal)
    });
    entries
}
