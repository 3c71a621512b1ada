//! The default generator: bank movements against their counterparties,
//! documents against P&L with the VAT portion on the split leg.

use crate::{ChargeWithData, EngineError, RateCache, ledger::LedgerEntryDraft, ledger::accounts};

use super::{LedgerIssue, bank_movement_entry, document_entry};

pub(crate) fn generate(
    charge: &ChargeWithData,
    rates: &RateCache,
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    let mut entries = Vec::new();
    let mut issues = Vec::new();

    for tx in &charge.transactions {
        let counter = if tx.is_fee {
            accounts::BANK_FEES.to_string()
        } else {
            tx.business_id.clone().unwrap_or_else(|| {
                if tx.amount.is_positive() {
                    accounts::GENERAL_REVENUE.to_string()
                } else {
                    accounts::GENERAL_EXPENSE.to_string()
                }
            })
        };
        if let Some(entry) = bank_movement_entry(charge, tx, counter, rates, &mut issues)? {
            entries.push(entry);
        }
    }

    for doc in &charge.documents {
        if let Some(entry) = document_entry(charge, doc, rates, &mut issues)? {
            entries.push(entry);
        }
    }

    Ok((entries, issues))
}
