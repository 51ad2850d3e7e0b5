use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::info;
use tracing_subscriber::EnvFilter;

use squad_synergy::config::{load_config, resolve_config_path};
use squad_synergy::dataset::{load_dataset, resolve_dataset_path};
use squad_synergy::engine::SynergyEngine;
use squad_synergy::export::export_analysis_xlsx;
use squad_synergy::persist::{report_path_for, write_report};
use squad_synergy::render::render_analysis;

const USAGE: &str = "usage: squad_synergy [--data PATH] [--config PATH] [--out PATH] [--xlsx PATH] [--quiet] [--no-save]";

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("squad_synergy=info,warn")),
        )
        .init();

    if has_flag("--help") || has_flag("-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let config_path = resolve_config_path(parse_path_arg("--config"));
    let config = load_config(&config_path)?;
    info!(path = %config_path.display(), players = config.roster.len(), "config loaded");

    let data_path = resolve_dataset_path(parse_path_arg("--data"))
        .ok_or_else(|| anyhow!("no dataset found; pass --data or set SYNERGY_DATA_PATH\n{USAGE}"))?;
    let mut raw = load_dataset(&data_path)?;

    let engine = SynergyEngine::new(config).context("build synergy engine")?;
    let analysis = engine
        .run(&mut raw.dataset)
        .with_context(|| format!("analyze {}", data_path.display()))?;

    if !has_flag("--quiet") {
        print!("{}", render_analysis(&analysis));
    }

    if !has_flag("--no-save") {
        let out_path = parse_path_arg("--out").unwrap_or_else(|| report_path_for(&data_path));
        write_report(&out_path, &analysis.report, Some(&data_path))?;
        println!("\nreport saved to {}", out_path.display());
    }

    if let Some(xlsx_path) = parse_path_arg("--xlsx") {
        let summary = export_analysis_xlsx(&xlsx_path, &analysis)?;
        println!(
            "workbook saved to {} ({} pairs, {} combos, {} impact rows)",
            xlsx_path.display(),
            summary.pairs,
            summary.combos,
            summary.impact_rows
        );
    }

    Ok(())
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&format!("{name}="))
            && !v.trim().is_empty()
        {
            return Some(PathBuf::from(v.trim()));
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
