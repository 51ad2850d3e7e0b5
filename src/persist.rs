use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::report::Report;

const REPORT_FILE: &str = "team_effect.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub generated_at: String,
    #[serde(default)]
    pub source: Option<String>,
    pub report: Report,
}

/// The report lands next to the dataset it was computed from.
pub fn report_path_for(data_path: &Path) -> PathBuf {
    data_path
        .parent()
        .map(|dir| dir.join(REPORT_FILE))
        .unwrap_or_else(|| PathBuf::from(REPORT_FILE))
}

pub fn write_report(path: &Path, report: &Report, source: Option<&Path>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create report directory {}", parent.display()))?;
    }
    let doc = ReportDocument {
        generated_at: chrono::Utc::now().to_rfc3339(),
        source: source.map(|p| p.display().to_string()),
        report: report.clone(),
    };
    let json = serde_json::to_string_pretty(&doc).context("serialize report")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write report {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap report {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

pub fn read_report(path: &Path) -> Result<ReportDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read report {}", path.display()))?;
    serde_json::from_str::<ReportDocument>(&raw)
        .with_context(|| format!("parse report {}", path.display()))
}
