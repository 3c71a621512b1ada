//! Business trips: the recognized allowance against the traveling employee;
//! bank payments clear the employee.

use crate::{
    ChargeWithData, Currency, EngineError, RateCache,
    ledger::{LedgerEntryDraft, accounts},
};

use super::{LedgerIssue, bank_movement_entry};

pub(crate) fn generate(
    charge: &ChargeWithData,
    rates: &RateCache,
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    let mut entries = Vec::new();
    let mut issues = Vec::new();

    for trip in &charge.business_trips {
        if trip.allowance.is_zero() {
            continue;
        }
        entries.push(
            LedgerEntryDraft::new(
                charge.id(),
                charge.charge.owner_id.clone(),
                Currency::Ils,
                trip.end_date,
                trip.end_date,
            )
            .description(format!("trip to {}", trip.destination))
            .debit(accounts::TRIP_EXPENSE, trip.allowance, None)?
            .credit(trip.employee_id.clone(), trip.allowance, None)?,
        );
    }

    for tx in &charge.transactions {
        let counter = match tx.business_id.clone() {
            Some(business) => business,
            None if charge.business_trips.len() == 1 => {
                charge.business_trips[0].employee_id.clone()
            }
            None => {
                issues.push(LedgerIssue {
                    charge_id: charge.id(),
                    message: format!("cannot attribute trip payment {} to an employee", tx.id),
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
