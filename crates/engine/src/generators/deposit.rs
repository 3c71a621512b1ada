//! Bank deposits: movements between a checking account and the named closed
//! deposit account.

use crate::{ChargeWithData, EngineError, RateCache, ledger::LedgerEntryDraft, ledger::accounts};

use super::{LedgerIssue, bank_movement_entry};

pub(crate) fn generate(
    charge: &ChargeWithData,
    rates: &RateCache,
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    let record = charge.deposit_records.first().ok_or_else(|| {
        EngineError::MissingRecord(format!("deposit charge {} has no deposit record", charge.id()))
    })?;

    let mut entries = Vec::new();
    let mut issues = Vec::new();
    let counter = accounts::deposit(&record.deposit_account_id);

    for tx in &charge.transactions {
        if let Some(entry) = bank_movement_entry(charge, tx, counter.clone(), rates, &mut issues)? {
            entries.push(entry);
        }
    }

    Ok((entries, issues))
}
