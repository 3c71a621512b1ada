//! Payroll: gross to salary expense, split between the employee, the income
//! tax authority and the pension fund; bank payments clear the employees.

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

    for record in &charge.salary_records {
        let withheld = record.net + record.income_tax;
        let mut entry = LedgerEntryDraft::new(
            charge.id(),
            charge.charge.owner_id.clone(),
            Currency::Ils,
            date,
            date,
        )
        .description(format!("salary {}", record.month))
        .debit(accounts::SALARY_EXPENSE, withheld, None)?
        .credit(record.employee_id.clone(), record.net, None)?;
        if !record.income_tax.is_zero() {
            entry = entry.credit(accounts::TAX_AUTHORITY, record.income_tax, None)?;
        }
        entries.push(entry);

        if !record.pension.is_zero() {
            entries.push(
                LedgerEntryDraft::new(
                    charge.id(),
                    charge.charge.owner_id.clone(),
                    Currency::Ils,
                    date,
                    date,
                )
                .description(format!("pension {}", record.month))
                .debit(accounts::SALARY_EXPENSE, record.pension, None)?
                .credit(accounts::PENSION_FUNDS, record.pension, None)?,
            );
        }

        let residual = record.gross - record.net - record.income_tax - record.pension;
        if !residual.is_zero() {
            issues.push(LedgerIssue {
                charge_id: charge.id(),
                message: format!(
                    "salary components for {} ({}) are off gross by {residual}",
                    record.employee_id, record.month
                ),
            });
        }
    }

    for tx in &charge.transactions {
        let counter = match tx.business_id.clone() {
            Some(business) => business,
            None if charge.salary_records.len() == 1 => {
                charge.salary_records[0].employee_id.clone()
            }
            None => {
                issues.push(LedgerIssue {
                    charge_id: charge.id(),
                    message: format!("cannot attribute salary payment {} to an employee", tx.id),
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
