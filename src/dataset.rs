use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

const DATA_PATH_ENV: &str = "SYNERGY_DATA_PATH";
const DEFAULT_DATA_PATHS: [&str; 3] = [
    "scripts/wcs_raw_data.json",
    "wcs_raw_data.json",
    "../wcs_raw_data.json",
];

/// One player's appearance in one match. `rating_delta` decides the outcome;
/// `is_win` as delivered by the collector is not trusted until corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub match_id: String,
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub player_id: String,
    pub team_id: i64,
    #[serde(deserialize_with = "flag_from_bool_or_number")]
    pub is_win: bool,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub rating_delta: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    #[serde(default)]
    pub match_count: usize,
    #[serde(default)]
    pub sample_count: Option<usize>,
    #[serde(default)]
    pub collected_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDataset {
    #[serde(default)]
    pub metadata: DatasetMetadata,
    pub dataset: Vec<ParticipationRecord>,
}

impl RawDataset {
    pub fn observed_match_count(&self) -> usize {
        let mut seen: Vec<&str> = self.dataset.iter().map(|r| r.match_id.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

pub fn parse_dataset_json(raw: &str) -> Result<RawDataset> {
    let dataset = serde_json::from_str::<RawDataset>(raw).context("parse dataset json")?;
    Ok(dataset)
}

pub fn load_dataset(path: &Path) -> Result<RawDataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read dataset {}", path.display()))?;
    let dataset = parse_dataset_json(&raw)
        .with_context(|| format!("parse dataset {}", path.display()))?;

    let observed = dataset.observed_match_count();
    info!(
        path = %path.display(),
        records = dataset.dataset.len(),
        matches = observed,
        "dataset loaded"
    );
    if dataset.metadata.match_count != observed {
        warn!(
            declared = dataset.metadata.match_count,
            observed, "metadata match count disagrees with records"
        );
    }
    Ok(dataset)
}

/// Explicit path first, then `SYNERGY_DATA_PATH`, then the collector's usual
/// output locations relative to the working directory.
pub fn resolve_dataset_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path);
    }
    if let Ok(raw) = env::var(DATA_PATH_ENV)
        && !raw.trim().is_empty()
    {
        return Some(PathBuf::from(raw.trim()));
    }
    DEFAULT_DATA_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

pub(crate) fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or integer id, got {other}"
        ))),
    }
}

fn flag_from_bool_or_number<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::Null => Ok(false),
        other => Err(de::Error::custom(format!(
            "expected boolean or 0/1 flag, got {other}"
        ))),
    }
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        Value::Null => Ok(0.0),
        other => Err(de::Error::custom(format!("expected number, got {other}"))),
    }
}
