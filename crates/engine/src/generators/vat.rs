//! Monthly VAT filing: payments to (or refunds from) the VAT authority move
//! against the VAT settlement account.

use crate::{ChargeWithData, EngineError, RateCache, ledger::LedgerEntryDraft, ledger::accounts};

use super::{LedgerIssue, bank_movement_entry, document_entry};

pub(crate) fn generate(
    charge: &ChargeWithData,
    rates: &RateCache,
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    let mut entries = Vec::new();
    let mut issues = Vec::new();

    for tx in &charge.transactions {
        if let Some(entry) = bank_movement_entry(
            charge,
            tx,
            accounts::VAT_SETTLEMENT.to_string(),
            rates,
            &mut issues,
        )? {
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
