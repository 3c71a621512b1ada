//! Foreign securities: movements on a securities account keep their foreign
//! legs and rate so the revaluation pass can re-price the holdings later.

use crate::{
    ChargeWithData, EngineError, RateCache, bank_transactions::AccountKind,
    ledger::LedgerEntryDraft, ledger::accounts,
};

use super::{LedgerIssue, bank_movement_entry, document_entry};

pub(crate) fn generate(
    charge: &ChargeWithData,
    rates: &RateCache,
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    let mut entries = Vec::new();
    let mut issues = Vec::new();

    for tx in &charge.transactions {
        let counter = if tx.account_kind == AccountKind::Securities {
            accounts::securities(&tx.account_id)
        } else {
            tx.business_id
                .clone()
                .unwrap_or_else(|| accounts::TRANSFER_CLEARING.to_string())
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
