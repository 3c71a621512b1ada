//! Per-type ledger generators and the dispatching glue.
//!
//! Each generator is pure with respect to its inputs except for
//! exchange-rate (and, for revaluation, prior-balance) lookups, which are
//! side-effect-free reads. A generator returns draft entries plus any
//! non-fatal issues; a missing exchange rate for one currency is reported
//! per entry, not fatal to the whole charge.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BankTransaction, ChargeKind, ChargeWithData, Currency, Document, EngineError, Money, RateCache,
    ledger::{BalanceReport, LedgerEntryDraft, accounts},
};

mod common;
mod conversion;
mod deposit;
mod dividend;
mod revaluation;
mod salary;
mod securities;
mod transfer;
mod trip;
mod vat;

pub(crate) use revaluation::designated_date;

/// A non-fatal problem found while generating one charge's entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerIssue {
    pub charge_id: Uuid,
    pub message: String,
}

/// Everything a generation run returns to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLedger {
    pub entries: Vec<LedgerEntryDraft>,
    pub balance: BalanceReport,
    pub errors: Vec<LedgerIssue>,
    /// `true` when the charge is locked and the entries were read from the
    /// store instead of being regenerated.
    pub from_store: bool,
}

/// Routes a charge to the generator matching its kind.
///
/// `prior_entries` is the owner's stored ledger history; only the
/// revaluation generator consumes it.
pub(crate) fn dispatch(
    charge: &ChargeWithData,
    rates: &RateCache,
    prior_entries: &[LedgerEntryDraft],
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    match charge.kind {
        ChargeKind::Common => common::generate(charge, rates),
        ChargeKind::Conversion => conversion::generate(charge, rates),
        ChargeKind::Salary => salary::generate(charge, rates),
        ChargeKind::InternalTransfer => transfer::generate(charge, rates),
        ChargeKind::Dividend => dividend::generate(charge, rates),
        ChargeKind::BusinessTrip => trip::generate(charge, rates),
        ChargeKind::MonthlyVat => vat::generate(charge, rates),
        ChargeKind::BankDeposit => deposit::generate(charge, rates),
        ChargeKind::ForeignSecurities => securities::generate(charge, rates),
        ChargeKind::Revaluation => revaluation::generate(charge, prior_entries, rates),
    }
}

/// Converts an amount into local minor units at the rate for `date`.
///
/// Returns the local amount and the rate used (`None` for the local
/// currency). `Err` carries the issue message for the missing rate.
pub(crate) fn localize(
    amount: Money,
    currency: Currency,
    date: NaiveDate,
    rates: &RateCache,
) -> Result<(Money, Option<f64>), String> {
    if currency.is_local() {
        return Ok((amount, None));
    }
    match rates.rate(currency, date) {
        Some(rate) => Ok((amount.convert(rate), Some(rate))),
        None => Err(format!("missing {currency} rate for {date}")),
    }
}

/// Best accounting date for entries that have no dated row of their own.
pub(crate) fn charge_date(charge: &ChargeWithData) -> NaiveDate {
    charge
        .accounting_date()
        .unwrap_or_else(|| charge.charge.created_at.date_naive())
}

/// One bank-side movement: bank account against `counter_entity`.
///
/// Money in debits the bank account and credits the counter entity; money
/// out does the reverse. A missing rate becomes an issue and the entry is
/// skipped.
pub(crate) fn bank_movement_entry(
    charge: &ChargeWithData,
    tx: &BankTransaction,
    counter_entity: String,
    rates: &RateCache,
    issues: &mut Vec<LedgerIssue>,
) -> Result<Option<LedgerEntryDraft>, EngineError> {
    let (local, rate) = match localize(tx.amount.abs(), tx.currency, tx.value_date, rates) {
        Ok(localized) => localized,
        Err(message) => {
            issues.push(LedgerIssue {
                charge_id: charge.id(),
                message: format!("{message} (transaction {})", tx.id),
            });
            return Ok(None);
        }
    };
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
    let entry = if tx.amount.is_positive() {
        entry.debit(bank, local, foreign)?.credit(counter_entity, local, foreign)?
    } else {
        entry.credit(bank, local, foreign)?.debit(counter_entity, local, foreign)?
    };
    Ok(Some(entry))
}

/// One document entry: counterparty against P&L, VAT split onto the second
/// leg.
pub(crate) fn document_entry(
    charge: &ChargeWithData,
    doc: &Document,
    rates: &RateCache,
    issues: &mut Vec<LedgerIssue>,
) -> Result<Option<LedgerEntryDraft>, EngineError> {
    let income = doc.amount.is_positive();
    let total = doc.amount.abs();
    let vat = doc.vat.abs();
    let net = total - vat;

    let (local_total, rate) = match localize(total, doc.currency, doc.date, rates) {
        Ok(localized) => localized,
        Err(message) => {
            issues.push(LedgerIssue {
                charge_id: charge.id(),
                message: format!("{message} (document {})", doc.id),
            });
            return Ok(None);
        }
    };
    // Deriving net from the converted total keeps the legs in parity even
    // when rounding the two conversions separately would not.
    let local_vat = rate.map_or(vat, |r| vat.convert(r));
    let local_net = local_total - local_vat;

    let foreign = !doc.currency.is_local();
    let counter = doc
        .business_id
        .clone()
        .unwrap_or_else(|| {
            if income {
                accounts::GENERAL_REVENUE.to_string()
            } else {
                accounts::GENERAL_EXPENSE.to_string()
            }
        });

    let mut entry = LedgerEntryDraft::new(
        charge.id(),
        charge.charge.owner_id.clone(),
        doc.currency,
        doc.date,
        doc.date,
    )
    .reference(doc.id.to_string());
    if let Some(rate) = rate {
        entry = entry.rate(rate);
    }
    if let Some(serial) = doc.serial.as_deref() {
        entry = entry.description(serial.to_string());
    }

    let entry = if income {
        let mut e = entry
            .debit(counter, local_total, foreign.then_some(total))?
            .credit(accounts::GENERAL_REVENUE, local_net, foreign.then_some(net))?;
        if !vat.is_zero() {
            e = e.credit(accounts::VAT_OUTPUTS, local_vat, foreign.then_some(vat))?;
        }
        e
    } else {
        let mut e = entry
            .credit(counter, local_total, foreign.then_some(total))?
            .debit(accounts::GENERAL_EXPENSE, local_net, foreign.then_some(net))?;
        if !vat.is_zero() {
            e = e.debit(accounts::VAT_INPUTS, local_vat, foreign.then_some(vat))?;
        }
        e
    };
    Ok(Some(entry))
}
