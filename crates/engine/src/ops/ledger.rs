//! Ledger generation against the store.
//!
//! The dispatcher route: lock gate first (frozen history is read verbatim,
//! never re-derived), then exactly one generator by charge kind, then the
//! hard split-leg check, then the idempotent insert-if-absent persistence.

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ChargeKind, ChargeWithData, Currency, GeneratedLedger, RateCache, ResultEngine, generators,
    ledger::{self, LedgerEntryDraft, validate_balance},
    lock::is_locked,
};

use super::{Engine, charges::load_charge_with_data, with_tx};

/// Options for [`Engine::generate_ledger`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerateOptions {
    /// Persist the generated drafts when the charge has no stored entries
    /// yet. Re-invoking on an already-ledgered, unlocked charge must not
    /// duplicate its entry set.
    pub insert_if_not_exists: bool,
}

impl Engine {
    /// Compiles one charge into its double-entry ledger records.
    pub async fn generate_ledger(
        &self,
        charge_id: Uuid,
        opts: GenerateOptions,
    ) -> ResultEngine<GeneratedLedger> {
        with_tx!(self, |db_tx| {
            self.generate_in(&db_tx, charge_id, opts).await
        })
    }

    /// Stored ledger entries of one charge.
    pub async fn ledger_entries(&self, charge_id: Uuid) -> ResultEngine<Vec<LedgerEntryDraft>> {
        stored_entries(&self.database, charge_id).await
    }

    async fn generate_in<C: ConnectionTrait>(
        &self,
        db: &C,
        charge_id: Uuid,
        opts: GenerateOptions,
    ) -> ResultEngine<GeneratedLedger> {
        let charge = load_charge_with_data(db, charge_id).await?;

        if is_locked(&charge, &self.lock_config) {
            tracing::debug!(charge = %charge_id, "charge is locked; reading stored entries");
            let entries = stored_entries(db, charge_id).await?;
            return Ok(GeneratedLedger {
                balance: validate_balance(&entries),
                entries,
                errors: Vec::new(),
                from_store: true,
            });
        }

        let mut rates = RateCache::new();
        rates.load(db, wanted_rate_pairs(&charge)).await?;

        let prior_entries = if charge.kind == ChargeKind::Revaluation {
            let prior = owner_entries(db, &charge.charge.owner_id).await?;
            let reval_date = generators::designated_date(&charge)?;
            let wanted: Vec<(Currency, NaiveDate)> = prior
                .iter()
                .map(|entry| (entry.currency, reval_date))
                .collect();
            rates.load(db, wanted).await?;
            prior
        } else {
            Vec::new()
        };

        let (entries, errors) = generators::dispatch(&charge, &rates, &prior_entries)?;
        for entry in &entries {
            entry.validate_shape()?;
        }
        let balance = validate_balance(&entries);
        if !balance.is_balanced {
            tracing::warn!(
                charge = %charge_id,
                entities = ?balance.unbalanced_entities,
                "generated entries do not balance"
            );
        }
        for issue in &errors {
            tracing::warn!(charge = %charge_id, issue = %issue.message, "ledger issue");
        }

        if opts.insert_if_not_exists {
            let existing = ledger::Entity::find()
                .filter(ledger::Column::ChargeId.eq(charge_id.to_string()))
                .count(db)
                .await?;
            if existing == 0 {
                for entry in &entries {
                    ledger::ActiveModel::from(entry).insert(db).await?;
                }
            } else {
                tracing::debug!(charge = %charge_id, "charge already ledgered; insert skipped");
            }
        }

        Ok(GeneratedLedger {
            entries,
            balance,
            errors,
            from_store: false,
        })
    }
}

fn wanted_rate_pairs(charge: &ChargeWithData) -> Vec<(Currency, NaiveDate)> {
    charge
        .transactions
        .iter()
        .map(|tx| (tx.currency, tx.value_date))
        .chain(charge.documents.iter().map(|doc| (doc.currency, doc.date)))
        .collect()
}

pub(crate) async fn stored_entries<C: ConnectionTrait>(
    db: &C,
    charge_id: Uuid,
) -> ResultEngine<Vec<LedgerEntryDraft>> {
    ledger::Entity::find()
        .filter(ledger::Column::ChargeId.eq(charge_id.to_string()))
        .all(db)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect()
}

async fn owner_entries<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
) -> ResultEngine<Vec<LedgerEntryDraft>> {
    ledger::Entity::find()
        .filter(ledger::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect()
}
