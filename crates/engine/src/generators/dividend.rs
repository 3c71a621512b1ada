//! Dividend distribution: gross out of retained earnings, net to the
//! shareholder, withholding to the tax authority on the split leg.

use crate::{
    ChargeWithData, Currency, EngineError, RateCache,
    ledger::{LedgerEntryDraft, accounts},
};

use super::{LedgerIssue, bank_movement_entry, charge_date};

pub(crate) fn generate(
    charge: &ChargeWithData,
    rates: &RateCache,
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    let mut entries = Vec::new();
    let mut issues = Vec::new();
    let date = charge_date(charge);

    for record in &charge.dividend_records {
        let gross = record.amount.abs();
        let withholding = record.withholding.abs();
        let net = gross - withholding;

        let mut entry = LedgerEntryDraft::new(
            charge.id(),
            charge.charge.owner_id.clone(),
            Currency::Ils,
            date,
            date,
        )
        .debit(accounts::RETAINED_EARNINGS, gross, None)?
        .credit(record.shareholder_id.clone(), net, None)?;
        if !withholding.is_zero() {
            entry = entry.credit(accounts::TAX_AUTHORITY, withholding, None)?;
        }
        entries.push(entry);
    }

    for tx in &charge.transactions {
        let counter = match tx.business_id.clone() {
            Some(business) => business,
            None if charge.dividend_records.len() == 1 => {
                charge.dividend_records[0].shareholder_id.clone()
            }
            None => {
                issues.push(LedgerIssue {
                    charge_id: charge.id(),
                    message: format!(
                        "cannot attribute dividend payment {} to a shareholder",
                        tx.id
                    ),
                });
                continue;
            }
        };
        if let Some(entry) = bank_movement_entry(charge, tx, counter, rates, &mut issues)? {
            entries.push(entry);
        }
    }

    Ok((entries, issues))
}
