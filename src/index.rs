use std::collections::{BTreeSet, HashMap};

use crate::config::Roster;
use crate::dataset::ParticipationRecord;
use crate::error::{Result, SynergyError};

/// Win rate assumed for a tracked player with no recorded matches.
pub const NO_HISTORY_WIN_RATE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Participation {
    pub player_id: String,
    pub team_id: i64,
    pub is_win: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMatch {
    pub match_id: String,
    pub team_id: i64,
    pub is_win: bool,
}

/// One tracked player's own appearances, in match order, with a lookup by
/// match id. If a player shows up twice in the same match the first
/// appearance answers lookups.
#[derive(Debug, Clone, Default)]
pub struct PlayerHistory {
    matches: Vec<PlayerMatch>,
    by_match: HashMap<String, usize>,
}

impl PlayerHistory {
    fn push(&mut self, entry: PlayerMatch) {
        let pos = self.matches.len();
        self.by_match.entry(entry.match_id.clone()).or_insert(pos);
        self.matches.push(entry);
    }

    pub fn matches(&self) -> &[PlayerMatch] {
        &self.matches
    }

    /// One entry per match: the appearance that answers `get`.
    pub fn first_appearances(&self) -> impl Iterator<Item = &PlayerMatch> {
        self.matches
            .iter()
            .enumerate()
            .filter(|(pos, m)| self.by_match.get(&m.match_id) == Some(pos))
            .map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn wins(&self) -> usize {
        self.matches.iter().filter(|m| m.is_win).count()
    }

    pub fn get(&self, match_id: &str) -> Option<&PlayerMatch> {
        self.by_match.get(match_id).map(|&pos| &self.matches[pos])
    }

    /// True when both players appear in `match_id` under the same team id.
    pub fn same_team_as(&self, other: &PlayerMatch) -> bool {
        self.get(&other.match_id)
            .is_some_and(|mine| mine.team_id == other.team_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub matches: usize,
    pub wins: usize,
    pub win_rate: f64,
}

impl Baseline {
    fn from_history(history: &PlayerHistory) -> Self {
        let matches = history.len();
        let wins = history.wins();
        let win_rate = if matches == 0 {
            NO_HISTORY_WIN_RATE
        } else {
            wins as f64 / matches as f64
        };
        Self {
            matches,
            wins,
            win_rate,
        }
    }
}

/// Per-slot baselines computed once so every analysis reads identical values.
#[derive(Debug, Clone, Default)]
pub struct BaselineTable {
    entries: Vec<Baseline>,
}

impl BaselineTable {
    pub fn get(&self, slot: usize) -> Baseline {
        self.entries.get(slot).copied().unwrap_or(Baseline {
            matches: 0,
            wins: 0,
            win_rate: NO_HISTORY_WIN_RATE,
        })
    }

    pub fn win_rate(&self, slot: usize) -> f64 {
        self.get(slot).win_rate
    }

    pub fn mean_win_rate(&self, slots: &[usize]) -> f64 {
        if slots.is_empty() {
            return NO_HISTORY_WIN_RATE;
        }
        let sum: f64 = slots.iter().map(|&s| self.win_rate(s)).sum();
        sum / slots.len() as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = &Baseline> {
        self.entries.iter()
    }
}

#[derive(Debug, Default)]
struct TeamOutcomes {
    tracked: usize,
    won: bool,
    lost: bool,
}

#[derive(Debug, Clone)]
pub struct OutcomeConflict {
    pub match_id: String,
    pub team_id: i64,
}

/// Immutable lookups over corrected records: every match's participants and
/// every tracked player's history.
#[derive(Debug, Clone)]
pub struct MatchIndex {
    roster: Roster,
    order: Vec<String>,
    matches: HashMap<String, Vec<Participation>>,
    histories: Vec<PlayerHistory>,
    baselines: BaselineTable,
    records: usize,
}

impl MatchIndex {
    pub fn build(roster: Roster, records: &[ParticipationRecord]) -> Self {
        let mut order = Vec::new();
        let mut matches: HashMap<String, Vec<Participation>> = HashMap::new();
        for record in records {
            let participants = matches.entry(record.match_id.clone()).or_insert_with(|| {
                order.push(record.match_id.clone());
                Vec::new()
            });
            participants.push(Participation {
                player_id: record.player_id.clone(),
                team_id: record.team_id,
                is_win: record.is_win,
            });
        }

        let mut histories = vec![PlayerHistory::default(); roster.len()];
        for match_id in &order {
            let Some(participants) = matches.get(match_id) else {
                continue;
            };
            for p in participants {
                let Some(slot) = roster.slot_of(&p.player_id) else {
                    continue;
                };
                histories[slot].push(PlayerMatch {
                    match_id: match_id.clone(),
                    team_id: p.team_id,
                    is_win: p.is_win,
                });
            }
        }

        let baselines = BaselineTable {
            entries: histories.iter().map(Baseline::from_history).collect(),
        };

        Self {
            roster,
            order,
            matches,
            histories,
            baselines,
            records: records.len(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn match_count(&self) -> usize {
        self.order.len()
    }

    pub fn match_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn participants(&self, match_id: &str) -> Option<&[Participation]> {
        self.matches.get(match_id).map(Vec::as_slice)
    }

    pub fn history(&self, slot: usize) -> &PlayerHistory {
        &self.histories[slot]
    }

    pub fn baselines(&self) -> &BaselineTable {
        &self.baselines
    }

    /// Every (match, team) where two or more tracked players disagree on the
    /// outcome, in match order then team id order. Untracked participants
    /// are never read by the analyses and are ignored here.
    pub fn outcome_conflicts(&self) -> Vec<OutcomeConflict> {
        let mut out = Vec::new();
        for match_id in &self.order {
            let Some(participants) = self.matches.get(match_id) else {
                continue;
            };
            let mut outcomes: HashMap<i64, TeamOutcomes> = HashMap::new();
            for p in participants {
                if self.roster.slot_of(&p.player_id).is_none() {
                    continue;
                }
                let seen = outcomes.entry(p.team_id).or_default();
                seen.tracked += 1;
                if p.is_win {
                    seen.won = true;
                } else {
                    seen.lost = true;
                }
            }
            let mixed: BTreeSet<i64> = outcomes
                .into_iter()
                .filter(|(_, seen)| seen.tracked >= 2 && seen.won && seen.lost)
                .map(|(team_id, _)| team_id)
                .collect();
            out.extend(mixed.into_iter().map(|team_id| OutcomeConflict {
                match_id: match_id.clone(),
                team_id,
            }));
        }
        out
    }

    pub fn validate_outcomes(&self) -> Result<()> {
        match self.outcome_conflicts().into_iter().next() {
            Some(conflict) => Err(SynergyError::InconsistentTeamOutcome {
                match_id: conflict.match_id,
                team_id: conflict.team_id,
            }),
            None => Ok(()),
        }
    }
}
