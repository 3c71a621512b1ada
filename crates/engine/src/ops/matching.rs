//! Auto-match execution against the store.
//!
//! The pure matching pipeline decides; these operations load the pools,
//! run it, and execute the winning merges. A batch pass wraps each merge in
//! its own nested transaction (a savepoint on the wire), so one bad charge
//! rolls back alone and the rest of the pass keeps going.

use std::collections::HashSet;

use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AutoMatchOutcome, ChargeSide, EngineError, ResultEngine, determine_merge_direction,
    process_charge_for_auto_match,
};

use super::{
    Engine,
    charges::{load_charge_with_data, load_unmatched_pool, merge_charges_in},
    with_tx,
};

/// Per-charge record of one batch pass, surfaced so an operator can act on
/// skipped and failed charges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoMatchReport {
    pub charge_id: Uuid,
    pub outcome: Option<AutoMatchOutcome>,
    /// The surviving charge when a merge was executed.
    pub merged_into: Option<Uuid>,
    pub error: Option<String>,
}

impl Engine {
    /// Auto-matches a single charge against its owner's unmatched pool,
    /// executing the merge when exactly one candidate clears the bar.
    pub async fn auto_match_charge(
        &self,
        charge_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<AutoMatchOutcome> {
        with_tx!(self, |db_tx| {
            let source = load_charge_with_data(&db_tx, charge_id).await?;
            let pool = load_unmatched_pool(&db_tx, &source.charge.owner_id).await?;
            let outcome = process_charge_for_auto_match(&source, &pool, user_id)?;

            if let Some(result) = &outcome.matched {
                let candidate = pool
                    .iter()
                    .find(|c| c.id() == result.candidate_charge_id)
                    .ok_or_else(|| {
                        EngineError::KeyNotFound("candidate charge not exists".to_string())
                    })?;
                let (to_delete, to_keep) = determine_merge_direction(&source, candidate);
                merge_charges_in(&db_tx, to_delete.id(), to_keep.id()).await?;
                tracing::info!(
                    user_id,
                    deleted = %to_delete.id(),
                    kept = %to_keep.id(),
                    score = result.score,
                    "auto-match merged charges"
                );
            }
            Ok(outcome)
        })
    }

    /// Runs one auto-match pass over every unmatched transaction-side charge
    /// of `owner_id`.
    ///
    /// One outer transaction for the pass; one nested transaction per merge.
    /// A per-charge failure is rolled back to its savepoint and recorded in
    /// the report, and the pass continues with the next charge.
    pub async fn auto_match_pass(
        &self,
        owner_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<AutoMatchReport>> {
        with_tx!(self, |db_tx| {
            let pool = load_unmatched_pool(&db_tx, owner_id).await?;
            let mut consumed: HashSet<Uuid> = HashSet::new();
            let mut reports = Vec::new();

            let sources: Vec<usize> = pool
                .iter()
                .enumerate()
                .filter(|(_, c)| c.unmatched_side() == Ok(ChargeSide::Transactions))
                .map(|(i, _)| i)
                .collect();

            for index in sources {
                let source = &pool[index];
                if consumed.contains(&source.id()) {
                    continue;
                }
                let candidates: Vec<_> = pool
                    .iter()
                    .filter(|c| c.id() != source.id() && !consumed.contains(&c.id()))
                    .cloned()
                    .collect();

                let outcome = match process_charge_for_auto_match(source, &candidates, user_id) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        reports.push(AutoMatchReport {
                            charge_id: source.id(),
                            outcome: None,
                            merged_into: None,
                            error: Some(err.to_string()),
                        });
                        continue;
                    }
                };

                let mut merged_into = None;
                let mut error = None;
                if let Some(result) = &outcome.matched {
                    let candidate = candidates
                        .iter()
                        .find(|c| c.id() == result.candidate_charge_id)
                        .ok_or_else(|| {
                            EngineError::KeyNotFound("candidate charge not exists".to_string())
                        })?;
                    let (to_delete, to_keep) = determine_merge_direction(source, candidate);

                    let savepoint = db_tx.begin().await?;
                    match merge_charges_in(&savepoint, to_delete.id(), to_keep.id()).await {
                        Ok(()) => {
                            savepoint.commit().await?;
                            consumed.insert(source.id());
                            consumed.insert(candidate.id());
                            merged_into = Some(to_keep.id());
                            tracing::info!(
                                user_id,
                                deleted = %to_delete.id(),
                                kept = %to_keep.id(),
                                score = result.score,
                                "auto-match merged charges"
                            );
                        }
                        Err(err) => {
                            savepoint.rollback().await?;
                            tracing::warn!(
                                charge = %source.id(),
                                error = %err,
                                "merge rolled back; continuing pass"
                            );
                            error = Some(err.to_string());
                        }
                    }
                }

                reports.push(AutoMatchReport {
                    charge_id: source.id(),
                    outcome: Some(outcome),
                    merged_into,
                    error,
                });
            }
            Ok(reports)
        })
    }
}
