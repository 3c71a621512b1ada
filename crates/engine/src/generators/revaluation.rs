//! Foreign-balance revaluation.
//!
//! A revaluation charge has no transactions or documents of its own: its
//! designated date comes out of the free-text description, and its entries
//! re-price every foreign-currency account's cumulative booked balance
//! against the rate on that date. Only the residual difference is booked;
//! accounts already at their market value emit nothing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{
    ChargeWithData, Currency, EngineError, Money, RateCache,
    ledger::{LedgerEntryDraft, accounts},
};

use super::LedgerIssue;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date pattern is valid"));

pub(crate) fn generate(
    charge: &ChargeWithData,
    prior_entries: &[LedgerEntryDraft],
    rates: &RateCache,
) -> Result<(Vec<LedgerEntryDraft>, Vec<LedgerIssue>), EngineError> {
    let reval_date = designated_date(charge)?;

    // Cumulative booked balances per (account, currency) as of the day
    // before. The strict date bound and the own-charge filter keep an
    // earlier run of this same revaluation from feeding back into itself.
    let mut balances: BTreeMap<(String, Currency), (Money, Money)> = BTreeMap::new();
    for entry in prior_entries {
        if entry.currency.is_local()
            || entry.value_date >= reval_date
            || entry.charge_id == charge.id()
        {
            continue;
        }
        for leg in entry.legs() {
            let Some(foreign) = leg.foreign else {
                continue;
            };
            if !is_account(leg.entity) {
                continue;
            }
            let (local_net, foreign_net) = balances
                .entry((leg.entity.to_string(), entry.currency))
                .or_default();
            if leg.is_credit {
                *local_net -= leg.local;
                *foreign_net -= foreign;
            } else {
                *local_net += leg.local;
                *foreign_net += foreign;
            }
        }
    }

    let mut entries = Vec::new();
    let mut issues = Vec::new();

    for ((entity, currency), (local_net, foreign_net)) in balances {
        let Some(rate) = rates.rate(currency, reval_date) else {
            issues.push(LedgerIssue {
                charge_id: charge.id(),
                message: format!("missing {currency} rate for {reval_date} ({entity})"),
            });
            continue;
        };
        let expected = foreign_net.convert(rate);
        let diff = local_net - expected;
        if diff.is_zero() {
            continue;
        }

        let entry = LedgerEntryDraft::new(
            charge.id(),
            charge.charge.owner_id.clone(),
            currency,
            reval_date,
            reval_date,
        )
        .description(format!("Revaluation {reval_date}"))
        .rate(rate);
        let entry = if diff.is_negative() {
            entry
                .credit(entity, diff.abs(), None)?
                .debit(accounts::REVALUATION, diff.abs(), None)?
        } else {
            entry
                .debit(entity, diff.abs(), None)?
                .credit(accounts::REVALUATION, diff.abs(), None)?
        };
        entries.push(entry);
    }

    Ok((entries, issues))
}

/// Extracts the designated `yyyy-mm-dd` date from the charge description.
pub(crate) fn designated_date(charge: &ChargeWithData) -> Result<NaiveDate, EngineError> {
    let description = charge
        .charge
        .user_description
        .as_deref()
        .ok_or(EngineError::MissingRevaluationDate(charge.id()))?;
    let found = DATE_PATTERN
        .find(description)
        .ok_or(EngineError::MissingRevaluationDate(charge.id()))?;
    NaiveDate::parse_from_str(found.as_str(), "%Y-%m-%d")
        .map_err(|_| EngineError::MissingRevaluationDate(charge.id()))
}

fn is_account(entity: &str) -> bool {
    entity.starts_with("bank:")
        || entity.starts_with("deposit:")
        || entity.starts_with("securities:")
}
