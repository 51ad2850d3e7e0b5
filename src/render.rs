use std::fmt::Write;

use crate::engine::Analysis;
use crate::impact::Confidence;
use crate::report::pair_label;

const RULE_WIDTH: usize = 70;
/// Pair effects and combo synergies beyond this are flagged.
const EFFECT_MARK: f64 = 0.05;
/// Subject averages beyond this get a trend marker.
const TREND_MARK: f64 = 0.03;

/// Terminal columns taken by `s`: East Asian wide and fullwidth characters
/// take two.
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

pub fn pad_right(s: &str, width: usize) -> String {
    let mut out = s.to_string();
    let used = display_width(s);
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x2FFFD
            | 0x30000..=0x3FFFD
    )
}

fn effect_marker(value: f64) -> char {
    if value > EFFECT_MARK {
        '+'
    } else if value < -EFFECT_MARK {
        '-'
    } else {
        '='
    }
}

fn trend_marker(value: f64) -> &'static str {
    if value > TREND_MARK {
        "up"
    } else if value < -TREND_MARK {
        "down"
    } else {
        "flat"
    }
}

fn confidence_marker(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "[ok]",
        Confidence::Neutral => "    ",
        Confidence::Low => "[??]",
    }
}

fn section(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "\n{rule}\n{title}\n{rule}");
}

pub fn render_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    let index = &analysis.index;
    let roster = index.roster();
    let baselines = index.baselines();

    section(&mut out, "Team effect analysis");
    let _ = writeln!(
        out,
        "  matches: {}  |  rows: {}",
        index.match_count(),
        index.record_count()
    );
    let _ = writeln!(
        out,
        "  win flags corrected from rating delta: {}",
        analysis.correction.mismatches
    );
    if analysis.outcome_conflicts > 0 {
        let _ = writeln!(
            out,
            "  teams with mixed outcomes: {}",
            analysis.outcome_conflicts
        );
    }

    let _ = writeln!(out, "\n  tracked players:");
    for (slot, player) in roster.players().iter().enumerate() {
        let b = baselines.get(slot);
        let wr = if b.matches == 0 { 0.0 } else { b.win_rate * 100.0 };
        let _ = writeln!(
            out,
            "    {}: {:3} matches, win rate {:.1}%",
            pad_right(&player.display_name, 16),
            b.matches,
            wr
        );
    }

    section(&mut out, "Pairs: win rate on the same team");
    let _ = writeln!(
        out,
        "\n    {}together  actual  expected  effect",
        pad_right("pair", 26)
    );
    let _ = writeln!(out, "  {}", "-".repeat(62));
    for r in analysis.pairs.records() {
        let _ = writeln!(
            out,
            "  {} {} {:3}     {:5.1}%  {:5.1}%   {:+5.1}%",
            effect_marker(r.effect),
            pad_right(&pair_label(roster, r.first, r.second), 26),
            r.together_matches,
            r.win_rate * 100.0,
            r.expected_win_rate * 100.0,
            r.effect * 100.0
        );
    }

    section(&mut out, "Individual impact: teammates with vs without");
    let _ = writeln!(out, "  [ok] = both sides >= 8 matches, [??] = a side < 5 matches");
    for subject in &analysis.impacts {
        let _ = writeln!(
            out,
            "\n  {} on teammates (average {:+.1}% {})",
            roster.name(subject.subject),
            subject.mean_delta * 100.0,
            trend_marker(subject.mean_delta)
        );
        for c in &subject.comparisons {
            let _ = writeln!(
                out,
                "  {} {} {} with: {:5.1}% ({}) | without: {:5.1}% ({}) | delta: {:+5.1}%",
                confidence_marker(c.confidence),
                effect_marker(c.delta),
                pad_right(roster.name(c.teammate), 14),
                c.with_win_rate * 100.0,
                c.with_matches,
                c.without_win_rate * 100.0,
                c.without_matches,
                c.delta * 100.0
            );
        }
    }

    section(&mut out, "Drag/boost index");
    let _ = writeln!(
        out,
        "\n  rank  {}avg effect  win rate  matches  band",
        pad_right("player", 18)
    );
    let _ = writeln!(out, "  {}", "-".repeat(66));
    for (i, e) in analysis.ranking.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:3}.  {}  {:+6.1}%    {:5.1}%   {:3}     {}",
            i + 1,
            pad_right(roster.name(e.slot), 16),
            e.average_effect * 100.0,
            e.personal_win_rate * 100.0,
            e.matches,
            e.band.label()
        );
    }

    section(&mut out, "Combos: same-team synergy");
    for size in analysis.combos.sizes() {
        let _ = writeln!(out, "\n  -- {size} players --");
        for c in analysis.combos.of_size(size) {
            let names: Vec<&str> = c.members.iter().map(|&s| roster.name(s)).collect();
            let _ = writeln!(
                out,
                "  {} {} {:2} matches  win: {:5.1}%  expected: {:5.1}%  synergy: {:+5.1}%",
                effect_marker(c.synergy),
                pad_right(&names.join(" + "), 38),
                c.matches,
                c.win_rate * 100.0,
                c.expected_win_rate * 100.0,
                c.synergy * 100.0
            );
        }
    }

    if let Some(h) = analysis.combos.headlines() {
        let names = |members: &[usize]| {
            members
                .iter()
                .map(|&s| roster.name(s))
                .collect::<Vec<_>>()
                .join(" + ")
        };
        let _ = writeln!(out, "\n  {}", "-".repeat(50));
        let _ = writeln!(out, "  best chemistry: {}", names(&h.best_synergy.members));
        let _ = writeln!(
            out,
            "     win rate {:.1}% ({} matches), synergy {:+.1}%",
            h.best_synergy.win_rate * 100.0,
            h.best_synergy.matches,
            h.best_synergy.synergy * 100.0
        );
        let _ = writeln!(out, "  worst chemistry: {}", names(&h.worst_synergy.members));
        let _ = writeln!(
            out,
            "     win rate {:.1}% ({} matches), synergy {:+.1}%",
            h.worst_synergy.win_rate * 100.0,
            h.worst_synergy.matches,
            h.worst_synergy.synergy * 100.0
        );
        let _ = writeln!(
            out,
            "  highest win rate: {}",
            names(&h.highest_win_rate.members)
        );
        let _ = writeln!(
            out,
            "     win rate {:.1}% ({} matches)",
            h.highest_win_rate.win_rate * 100.0,
            h.highest_win_rate.matches
        );
    }

    out
}
