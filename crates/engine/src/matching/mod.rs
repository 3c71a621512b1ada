//! Pairing unmatched transaction charges with unmatched document charges.
//!
//! The scorer, finder and auto-match processor are pure over their inputs:
//! results are produced fresh per invocation and never cached across calls,
//! because the candidate pools mutate between reconciliation passes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ChargeWithData, EngineError};

mod auto;
mod merge;
mod score;

pub use auto::{AUTO_MATCH_THRESHOLD, AutoMatchOutcome, AutoMatchStatus, process_charge_for_auto_match};
pub use merge::determine_merge_direction;
pub use score::{
    AMOUNT_WEIGHT, BUSINESS_WEIGHT, DATE_TOLERANCE_DAYS, DATE_WEIGHT, MatchSignals, SignalScore,
    amount_score, business_score, date_score, score_charges,
};

/// One scored pairing between a source charge and a complementary candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub source_charge_id: Uuid,
    pub candidate_charge_id: Uuid,
    /// Combined confidence in `[0, 1]`.
    pub score: f64,
    pub signals: MatchSignals,
}

/// Options for [`find_matches`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FindOptions {
    /// Prune candidates whose dates are more than this many calendar months
    /// away before scoring. `None` searches the entire pool (the auto-match
    /// path must see every unmatched charge, not just temporally-nearby
    /// ones).
    pub date_window_months: Option<u32>,
    /// Cap the returned list to the top-N by score. `None` returns all.
    pub max_matches: Option<usize>,
}

/// Ranks the complementary candidates for `source`, best first.
///
/// Ties are broken by candidate id so repeated runs over the same pool rank
/// identically. Candidates that are matched, empty, same-side or the source
/// itself are skipped, not errors; a matched or empty *source* is a
/// precondition violation.
pub fn find_matches(
    source: &ChargeWithData,
    candidates: &[ChargeWithData],
    requester: &str,
    opts: &FindOptions,
) -> Result<Vec<MatchResult>, EngineError> {
    let source_side = source.unmatched_side()?;
    let wanted_side = source_side.complement();
    let source_date = source.side_date(source_side);

    let mut results: Vec<MatchResult> = Vec::new();
    for candidate in candidates {
        if candidate.id() == source.id() {
            continue;
        }
        let Ok(candidate_side) = candidate.unmatched_side() else {
            continue;
        };
        if candidate_side != wanted_side {
            continue;
        }
        if let (Some(window), Some(a), Some(b)) =
            (opts.date_window_months, source_date, candidate.side_date(candidate_side))
            && months_apart(a, b) > window
        {
            continue;
        }

        let signals = score_charges(source, source_side, candidate, candidate_side);
        results.push(MatchResult {
            source_charge_id: source.id(),
            candidate_charge_id: candidate.id(),
            score: signals.combined(),
            signals,
        });
    }

    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.candidate_charge_id.cmp(&b.candidate_charge_id))
    });
    if let Some(cap) = opts.max_matches {
        results.truncate(cap);
    }

    tracing::debug!(
        requester,
        source = %source.id(),
        candidates = results.len(),
        "ranked match candidates"
    );
    Ok(results)
}

/// Calendar-month distance used by the cheap date-window prune.
fn months_apart(a: chrono::NaiveDate, b: chrono::NaiveDate) -> u32 {
    use chrono::Datelike;
    let a_months = a.year() * 12 + a.month0() as i32;
    let b_months = b.year() * 12 + b.month0() as i32;
    a_months.abs_diff(b_months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn months_apart_spans_year_boundaries() {
        let december = NaiveDate::from_ymd_opt(2023, 12, 28).unwrap();
        let january = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(months_apart(december, january), 1);
        assert_eq!(months_apart(december, december), 0);

        let june = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(months_apart(december, june), 6);
    }
}
