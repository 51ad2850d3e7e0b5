use tracing::debug;

use crate::dataset::ParticipationRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionSummary {
    pub records: usize,
    pub mismatches: usize,
}

/// A rating gain is a win; zero or a loss of rating is a loss.
pub fn corrected_outcome(rating_delta: f64) -> bool {
    rating_delta > 0.0
}

/// Rewrites `is_win` from `rating_delta` in place. The collector's own win
/// flag comes from a team numbering that does not always agree with the
/// match winner field, so the rating movement is authoritative.
pub fn correct_labels(records: &mut [ParticipationRecord]) -> CorrectionSummary {
    let mut summary = CorrectionSummary {
        records: records.len(),
        mismatches: 0,
    };
    for record in records.iter_mut() {
        let corrected = corrected_outcome(record.rating_delta);
        if record.is_win != corrected {
            debug!(
                match_id = %record.match_id,
                player_id = %record.player_id,
                rating_delta = record.rating_delta,
                "win flag corrected"
            );
            record.is_win = corrected;
            summary.mismatches += 1;
        }
    }
    summary
}
