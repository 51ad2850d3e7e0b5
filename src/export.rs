use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::engine::Analysis;
use crate::report::{pair_label, percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub pairs: usize,
    pub combos: usize,
    pub ranking: usize,
    pub impact_rows: usize,
}

pub fn export_analysis_xlsx(path: &Path, analysis: &Analysis) -> Result<ExportSummary> {
    let rows = build_sheets(analysis);

    let mut workbook = Workbook::new();
    for (name, sheet_rows) in [
        ("Pairs", &rows.pairs),
        ("Combos", &rows.combos),
        ("Ranking", &rows.ranking),
        ("Impact", &rows.impact),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_rows(sheet, sheet_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    info!(path = %path.display(), "workbook exported");

    Ok(ExportSummary {
        pairs: rows.pairs.len().saturating_sub(1),
        combos: rows.combos.len().saturating_sub(1),
        ranking: rows.ranking.len().saturating_sub(1),
        impact_rows: rows.impact.len().saturating_sub(1),
    })
}

struct SheetRows {
    pairs: Vec<Vec<String>>,
    combos: Vec<Vec<String>>,
    ranking: Vec<Vec<String>>,
    impact: Vec<Vec<String>>,
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn pct(fraction: f64) -> String {
    format!("{:.1}", percent(fraction))
}

fn build_sheets(analysis: &Analysis) -> SheetRows {
    let roster = analysis.index.roster();

    let mut pairs = vec![header(&[
        "Pair",
        "Together",
        "Wins",
        "Actual %",
        "Expected %",
        "Effect %",
    ])];
    for r in analysis.pairs.records() {
        pairs.push(vec![
            pair_label(roster, r.first, r.second),
            r.together_matches.to_string(),
            r.together_wins.to_string(),
            pct(r.win_rate),
            pct(r.expected_win_rate),
            pct(r.effect),
        ]);
    }

    let mut combos = vec![header(&[
        "Players",
        "Size",
        "Matches",
        "Wins",
        "Win %",
        "Expected %",
        "Synergy %",
    ])];
    for c in analysis.combos.records() {
        let names: Vec<&str> = c.members.iter().map(|&s| roster.name(s)).collect();
        combos.push(vec![
            names.join(" + "),
            c.size().to_string(),
            c.matches.to_string(),
            c.wins.to_string(),
            pct(c.win_rate),
            pct(c.expected_win_rate),
            pct(c.synergy),
        ]);
    }

    let mut ranking = vec![header(&[
        "Rank",
        "Player",
        "Avg Effect %",
        "Pairs",
        "Win %",
        "Matches",
        "Band",
    ])];
    for (i, e) in analysis.ranking.iter().enumerate() {
        ranking.push(vec![
            (i + 1).to_string(),
            roster.name(e.slot).to_string(),
            pct(e.average_effect),
            e.pair_count.to_string(),
            pct(e.personal_win_rate),
            e.matches.to_string(),
            e.band.label().to_string(),
        ]);
    }

    let mut impact = vec![header(&[
        "Subject",
        "Teammate",
        "With",
        "With %",
        "Without",
        "Without %",
        "Delta %",
        "Confidence",
    ])];
    for subject in &analysis.impacts {
        for c in &subject.comparisons {
            impact.push(vec![
                roster.name(subject.subject).to_string(),
                roster.name(c.teammate).to_string(),
                c.with_matches.to_string(),
                pct(c.with_win_rate),
                c.without_matches.to_string(),
                pct(c.without_win_rate),
                pct(c.delta),
                c.confidence.label().to_string(),
            ]);
        }
    }

    SheetRows {
        pairs,
        combos,
        ranking,
        impact,
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
