//! Internal transfer between the owner's own accounts, via the transfer
//! clearing account. Any gap between the two sides is booked as bank fees.

use crate::{
    ChargeWithData, Currency, EngineError, Money, RateCache,
    ledger::{LedgerEntryDraft, accounts},
};

use super::{LedgerIssue, localize};

pub(crate) fn generate(
    charge: &ChargeWithData,
    rates: &RateCache,
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    let outgoing = charge
        .transactions
        .iter()
        .find(|t| t.amount.is_negative())
        .ok_or_else(|| {
            EngineError::MissingRecord(format!(
                "internal transfer {} has no outgoing side",
                charge.id()
            ))
        })?;
    let incoming = charge
        .transactions
        .iter()
        .find(|t| t.amount.is_positive())
        .ok_or_else(|| {
            EngineError::MissingRecord(format!(
                "internal transfer {} has no incoming side",
                charge.id()
            ))
        })?;

    let mut entries = Vec::new();
    let mut issues = Vec::new();
    let mut locals: [Option<Money>; 2] = [None, None];

    for (slot, tx) in [(0, outgoing), (1, incoming)] {
        let (local, rate) = match localize(tx.amount.abs(), tx.currency, tx.value_date, rates) {
            Ok(localized) => localized,
            Err(message) => {
                issues.push(LedgerIssue {
                    charge_id: charge.id(),
                    message: format!("{message} (transaction {})", tx.id),
                });
                continue;
            }
        };
        locals[slot] = Some(local);
        let foreign = (!tx.currency.is_local()).then(|| tx.amount.abs());
        let bank = accounts::bank(&tx.account_id);

        let mut entry = LedgerEntryDraft::new(
            charge.id(),
            charge.charge.owner_id.clone(),
            tx.currency,
            tx.event_date,
            tx.value_date,
        )
        .reference(tx.id.to_string());
        if let Some(rate) = rate {
            entry = entry.rate(rate);
        }
        let entry = if tx.amount.is_negative() {
            entry
                .credit(bank, local, foreign)?
                .debit(accounts::TRANSFER_CLEARING, local, foreign)?
        } else {
            entry
                .debit(bank, local, foreign)?
                .credit(accounts::TRANSFER_CLEARING, local, foreign)?
        };
        entries.push(entry);
    }

    if let [Some(local_out), Some(local_in)] = locals {
        let gap = local_out - local_in;
        if !gap.is_zero() {
            let entry = LedgerEntryDraft::new(
                charge.id(),
                charge.charge.owner_id.clone(),
                Currency::Ils,
                incoming.event_date,
                incoming.value_date,
            );
            let entry = if gap.is_positive() {
                entry
                    .debit(accounts::BANK_FEES, gap, None)?
                    .credit(accounts::TRANSFER_CLEARING, gap, None)?
            } else {
                entry
                    .credit(accounts::BANK_FEES, gap.abs(), None)?
                    .debit(accounts::TRANSFER_CLEARING, gap.abs(), None)?
            };
            entries.push(entry);
        }
    }

    Ok((entries, issues))
}
