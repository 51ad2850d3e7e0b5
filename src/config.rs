use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynergyError};
use crate::ranking::BandThresholds;

/// Combo analysis enumerates every subset of size >= 3, so the roster has to
/// stay small enough for that to be cheap (4017 subsets at 12 players).
pub const MAX_ROSTER_SIZE: usize = 12;

const CONFIG_PATH_ENV: &str = "SYNERGY_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "synergy.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPlayer {
    #[serde(deserialize_with = "crate::dataset::id_from_string_or_number")]
    pub player_id: String,
    pub display_name: String,
}

impl TrackedPlayer {
    pub fn new(player_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleGates {
    pub min_pair_matches: usize,
    pub min_combo_matches: usize,
    /// Applies to both the "with" and "without" side of an impact comparison.
    pub min_impact_matches: usize,
    pub high_confidence_matches: usize,
    pub low_confidence_below: usize,
}

impl Default for SampleGates {
    fn default() -> Self {
        Self {
            min_pair_matches: 2,
            min_combo_matches: 3,
            min_impact_matches: 2,
            high_confidence_matches: 8,
            low_confidence_below: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyConfig {
    pub roster: Vec<TrackedPlayer>,
    #[serde(default)]
    pub gates: SampleGates,
    #[serde(default)]
    pub bands: BandThresholds,
    /// Reject data where one team in one match has mixed outcomes.
    #[serde(default = "default_strict_outcomes")]
    pub strict_outcomes: bool,
}

fn default_strict_outcomes() -> bool {
    true
}

impl SynergyConfig {
    pub fn new(roster: Vec<TrackedPlayer>) -> Self {
        Self {
            roster,
            gates: SampleGates::default(),
            bands: BandThresholds::default(),
            strict_outcomes: default_strict_outcomes(),
        }
    }

    /// Checks gates and bands, and returns the roster built from this config.
    pub fn validate(&self) -> Result<Roster> {
        if self.gates.min_pair_matches == 0
            || self.gates.min_combo_matches == 0
            || self.gates.min_impact_matches == 0
        {
            return Err(SynergyError::InvalidConfig(
                "sample gates must be at least 1".to_string(),
            ));
        }
        self.bands.validate()?;
        Roster::new(self.roster.clone())
    }
}

/// Validated, ordered roster. Slot numbers are positions in configuration
/// order and are what every analysis keys on.
#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<TrackedPlayer>,
    slots: HashMap<String, usize>,
}

impl Roster {
    pub fn new(players: Vec<TrackedPlayer>) -> Result<Self> {
        if players.is_empty() {
            return Err(SynergyError::InvalidConfig("roster is empty".to_string()));
        }
        if players.len() > MAX_ROSTER_SIZE {
            return Err(SynergyError::InvalidConfig(format!(
                "roster has {} players, at most {MAX_ROSTER_SIZE} are supported",
                players.len()
            )));
        }
        let mut slots = HashMap::with_capacity(players.len());
        for (slot, player) in players.iter().enumerate() {
            if player.player_id.trim().is_empty() {
                return Err(SynergyError::InvalidConfig(format!(
                    "roster entry {slot} has an empty player id"
                )));
            }
            if slots.insert(player.player_id.clone(), slot).is_some() {
                return Err(SynergyError::InvalidConfig(format!(
                    "player id {} appears more than once",
                    player.player_id
                )));
            }
        }
        Ok(Self { players, slots })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[TrackedPlayer] {
        &self.players
    }

    pub fn slot_of(&self, player_id: &str) -> Option<usize> {
        self.slots.get(player_id).copied()
    }

    pub fn name(&self, slot: usize) -> &str {
        self.players
            .get(slot)
            .map(|p| p.display_name.as_str())
            .unwrap_or("?")
    }
}

pub fn parse_config_json(raw: &str) -> anyhow::Result<SynergyConfig> {
    let config = serde_json::from_str::<SynergyConfig>(raw)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> anyhow::Result<SynergyConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    parse_config_json(&raw).with_context(|| format!("parse config {}", path.display()))
}

pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    match env::var(CONFIG_PATH_ENV) {
        Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}
