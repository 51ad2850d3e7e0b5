use tracing::{info, warn};

use crate::combos::{ComboTable, analyze_combos};
use crate::config::{Roster, SynergyConfig};
use crate::correction::{CorrectionSummary, correct_labels};
use crate::dataset::ParticipationRecord;
use crate::error::Result;
use crate::impact::{SubjectImpact, analyze_impacts};
use crate::index::MatchIndex;
use crate::pairs::{PairTable, analyze_pairs};
use crate::ranking::{RankingEntry, rank_players};
use crate::report::{Report, assemble_report};

/// Everything one run produces. `report` is the external contract; the rest
/// is kept for rendering and export.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub correction: CorrectionSummary,
    pub outcome_conflicts: usize,
    pub index: MatchIndex,
    pub pairs: PairTable,
    pub impacts: Vec<SubjectImpact>,
    pub combos: ComboTable,
    pub ranking: Vec<RankingEntry>,
    pub report: Report,
}

#[derive(Debug, Clone)]
pub struct SynergyEngine {
    config: SynergyConfig,
    roster: Roster,
}

impl SynergyEngine {
    pub fn new(config: SynergyConfig) -> Result<Self> {
        let roster = config.validate()?;
        Ok(Self { config, roster })
    }

    pub fn config(&self) -> &SynergyConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Corrects win flags in place, then indexes and analyzes.
    pub fn run(&self, records: &mut [ParticipationRecord]) -> Result<Analysis> {
        let correction = correct_labels(records);
        if correction.mismatches > 0 {
            info!(
                fixed = correction.mismatches,
                records = correction.records,
                "win flags corrected from rating delta"
            );
        }

        let index = MatchIndex::build(self.roster.clone(), records);
        info!(
            matches = index.match_count(),
            records = index.record_count(),
            tracked = self.roster.len(),
            "match index built"
        );

        if self.config.strict_outcomes {
            index.validate_outcomes()?;
        }
        let conflicts = index.outcome_conflicts();
        if let Some(first) = conflicts.first() {
            warn!(
                count = conflicts.len(),
                match_id = %first.match_id,
                team_id = first.team_id,
                "teams with mixed outcomes, results may be skewed"
            );
        }

        Ok(self.analyze_index(index, correction, conflicts.len()))
    }

    fn analyze_index(
        &self,
        index: MatchIndex,
        correction: CorrectionSummary,
        outcome_conflicts: usize,
    ) -> Analysis {
        let gates = &self.config.gates;
        let (pairs, (impacts, combos)) = rayon::join(
            || analyze_pairs(&index, gates),
            || {
                rayon::join(
                    || analyze_impacts(&index, gates),
                    || analyze_combos(&index, gates),
                )
            },
        );
        let ranking = rank_players(
            self.roster.len(),
            &pairs,
            index.baselines(),
            &self.config.bands,
        );
        info!(
            pairs = pairs.len(),
            subjects = impacts.len(),
            combos = combos.len(),
            "analysis complete"
        );

        let report = assemble_report(&self.roster, &pairs, &combos, &ranking);
        Analysis {
            correction,
            outcome_conflicts,
            index,
            pairs,
            impacts,
            combos,
            ranking,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackedPlayer;
    use crate::error::SynergyError;

    fn rec(match_id: &str, player_id: &str, team_id: i64, rating_delta: f64) -> ParticipationRecord {
        ParticipationRecord {
            match_id: match_id.into(),
            player_id: player_id.into(),
            team_id,
            is_win: false,
            rating_delta,
        }
    }

    fn config() -> SynergyConfig {
        SynergyConfig::new(vec![TrackedPlayer::new("a", "A"), TrackedPlayer::new("b", "B")])
    }

    #[test]
    fn empty_roster_is_invalid_config() {
        let err = SynergyEngine::new(SynergyConfig::new(Vec::new())).unwrap_err();
        assert!(matches!(err, SynergyError::InvalidConfig(_)));
    }

    #[test]
    fn run_corrects_before_indexing() {
        let engine = SynergyEngine::new(config()).unwrap();
        let mut records = vec![
            rec("m1", "a", 0, 5.0),
            rec("m1", "b", 0, 4.0),
            rec("m2", "a", 0, 5.0),
            rec("m2", "b", 0, 6.0),
        ];
        let analysis = engine.run(&mut records).unwrap();
        assert_eq!(analysis.correction.mismatches, 4);
        assert!(records.iter().all(|r| r.is_win));
        assert_eq!(analysis.pairs.len(), 1);
        assert_eq!(analysis.report.pairs[0].actual_win_rate, 100.0);
    }

    #[test]
    fn strict_mode_rejects_mixed_team_outcomes() {
        let engine = SynergyEngine::new(config()).unwrap();
        let mut records = vec![rec("m1", "a", 0, 5.0), rec("m1", "b", 0, -4.0)];
        let err = engine.run(&mut records).unwrap_err();
        assert_eq!(
            err,
            SynergyError::InconsistentTeamOutcome {
                match_id: "m1".into(),
                team_id: 0
            }
        );

        let mut lenient = config();
        lenient.strict_outcomes = false;
        let engine = SynergyEngine::new(lenient).unwrap();
        let analysis = engine.run(&mut records).unwrap();
        assert_eq!(analysis.outcome_conflicts, 1);
    }

    #[test]
    fn strict_mode_ignores_untracked_mixed_outcomes() {
        let engine = SynergyEngine::new(config()).unwrap();
        let mut records = vec![
            rec("m1", "a", 0, 5.0),
            rec("m1", "b", 0, 4.0),
            rec("m2", "a", 0, 5.0),
            rec("m2", "b", 0, 6.0),
            rec("m3", "a", 0, -3.0),
            rec("m3", "z", 1, 0.0),
            rec("m3", "w", 1, 2.0),
        ];
        let analysis = engine.run(&mut records).expect("untracked rows never fail the run");
        assert_eq!(analysis.outcome_conflicts, 0);
        assert_eq!(analysis.pairs.len(), 1);
        assert_eq!(analysis.correction.records, 7);
    }
}
