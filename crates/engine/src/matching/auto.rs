//! Automatic high-confidence matching.
//!
//! The processor searches the *entire* complementary pool (no date window)
//! but accepts only candidates clearing a high fixed bar, and refuses to
//! pick among ties: an incorrect auto-merge corrupts financial history,
//! while a missed merge just waits for an operator. False merges are worse
//! than missed ones.

use serde::{Deserialize, Serialize};

use crate::{ChargeWithData, EngineError};

use super::{FindOptions, MatchResult, find_matches};

/// Minimum combined confidence for an automatic merge.
pub const AUTO_MATCH_THRESHOLD: f64 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoMatchStatus {
    Matched,
    /// Ambiguous: two or more candidates cleared the bar.
    Skipped,
    NoMatch,
}

impl AutoMatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Skipped => "skipped",
            Self::NoMatch => "no-match",
        }
    }
}

/// Outcome of one auto-match attempt, with an operator-readable reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoMatchOutcome {
    pub matched: Option<MatchResult>,
    pub status: AutoMatchStatus,
    pub reason: String,
}

/// Attempts to auto-match `source` against the full candidate pool.
///
/// Errors when `source` is already matched or has neither side populated;
/// both are precondition violations recorded per charge by batch drivers.
pub fn process_charge_for_auto_match(
    source: &ChargeWithData,
    candidates: &[ChargeWithData],
    user_id: &str,
) -> Result<AutoMatchOutcome, EngineError> {
    // Global search: the full ranked list is needed to detect ambiguity.
    let ranked = find_matches(
        source,
        candidates,
        user_id,
        &FindOptions {
            date_window_months: None,
            max_matches: None,
        },
    )?;

    let confident: Vec<&MatchResult> = ranked
        .iter()
        .filter(|result| result.score >= AUTO_MATCH_THRESHOLD)
        .collect();

    let outcome = match confident.as_slice() {
        [] => {
            let reason = match ranked.first() {
                Some(best) => format!(
                    "no candidate reached {AUTO_MATCH_THRESHOLD}; best was charge {} at {:.2}",
                    best.candidate_charge_id, best.score
                ),
                None => "no complementary candidates".to_string(),
            };
            AutoMatchOutcome {
                matched: None,
                status: AutoMatchStatus::NoMatch,
                reason,
            }
        }
        [single] => AutoMatchOutcome {
            matched: Some((*single).clone()),
            status: AutoMatchStatus::Matched,
            reason: format!(
                "single candidate {} at {:.2}",
                single.candidate_charge_id, single.score
            ),
        },
        many => AutoMatchOutcome {
            matched: None,
            status: AutoMatchStatus::Skipped,
            reason: format!(
                "{} candidates at or above {AUTO_MATCH_THRESHOLD}; refusing to pick",
                many.len()
            ),
        },
    };

    tracing::debug!(
        user_id,
        source = %source.id(),
        status = outcome.status.as_str(),
        reason = %outcome.reason,
        "auto-match outcome"
    );
    Ok(outcome)
}
