//! Ledger entry primitives and balance validation.
//!
//! A [`LedgerEntryDraft`] is one double-entry bookkeeping line with up to two
//! credit and two debit legs (split-entity bookkeeping: e.g. an expense
//! document debits the expense account on leg 1 and the VAT-inputs account on
//! leg 2). Local amounts are minor units of the local currency; foreign
//! amounts, when present, are minor units of the entry's own currency.
//!
//! Drafts are ephemeral: generators produce them, the balance validator
//! inspects them, and only then does the store make them durable. Once the
//! owning charge is locked they are read verbatim and never regenerated.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money};

/// Book-keeping entities the generators post against.
///
/// Counterparty businesses and bank accounts are data-driven; everything the
/// owner's chart of accounts provides gets a fixed name here. The balance
/// validator treats these (and the prefixed account families) as internal:
/// only counterparty businesses are expected to net to zero within a charge.
pub mod accounts {
    pub const GENERAL_REVENUE: &str = "general_revenue";
    pub const GENERAL_EXPENSE: &str = "general_expense";
    pub const VAT_INPUTS: &str = "vat_inputs";
    pub const VAT_OUTPUTS: &str = "vat_outputs";
    pub const VAT_SETTLEMENT: &str = "vat_settlement";
    /// Business id the VAT authority appears under in bank feeds.
    pub const VAT_AUTHORITY: &str = "vat_authority";
    pub const TAX_AUTHORITY: &str = "tax_authority";
    pub const PENSION_FUNDS: &str = "pension_funds";
    pub const SALARY_EXPENSE: &str = "salary_expense";
    pub const RETAINED_EARNINGS: &str = "retained_earnings";
    pub const TRIP_EXPENSE: &str = "business_trip_expense";
    pub const CONVERSION_CLEARING: &str = "conversion_clearing";
    pub const TRANSFER_CLEARING: &str = "transfer_clearing";
    pub const BANK_FEES: &str = "bank_fees";
    pub const EXCHANGE_DIFF: &str = "exchange_rate_diff";
    pub const REVALUATION: &str = "revaluation";

    const SYSTEM: &[&str] = &[
        GENERAL_REVENUE,
        GENERAL_EXPENSE,
        VAT_INPUTS,
        VAT_OUTPUTS,
        VAT_SETTLEMENT,
        VAT_AUTHORITY,
        TAX_AUTHORITY,
        PENSION_FUNDS,
        SALARY_EXPENSE,
        RETAINED_EARNINGS,
        TRIP_EXPENSE,
        CONVERSION_CLEARING,
        TRANSFER_CLEARING,
        BANK_FEES,
        EXCHANGE_DIFF,
        REVALUATION,
    ];

    /// Entity name for a checking account.
    #[must_use]
    pub fn bank(account_id: &str) -> String {
        format!("bank:{account_id}")
    }

    /// Entity name for a closed deposit account.
    #[must_use]
    pub fn deposit(deposit_account_id: &str) -> String {
        format!("deposit:{deposit_account_id}")
    }

    /// Entity name for a securities account.
    #[must_use]
    pub fn securities(account_id: &str) -> String {
        format!("securities:{account_id}")
    }

    /// Internal entities are the owner's own accounts; they legitimately
    /// carry a net within a single charge.
    #[must_use]
    pub fn is_internal(entity: &str) -> bool {
        SYSTEM.contains(&entity)
            || entity.starts_with("bank:")
            || entity.starts_with("deposit:")
            || entity.starts_with("securities:")
    }
}

/// One leg of an entry, flattened out of the four slot fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LedgerLeg<'a> {
    pub entity: &'a str,
    pub is_credit: bool,
    pub local: Money,
    pub foreign: Option<Money>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntryDraft {
    pub charge_id: Uuid,
    pub owner_id: String,
    pub currency: Currency,
    pub credit_entity1: Option<String>,
    pub credit_entity2: Option<String>,
    pub debit_entity1: Option<String>,
    pub debit_entity2: Option<String>,
    pub credit_local1: Money,
    pub credit_local2: Money,
    pub debit_local1: Money,
    pub debit_local2: Money,
    pub credit_foreign1: Option<Money>,
    pub credit_foreign2: Option<Money>,
    pub debit_foreign1: Option<Money>,
    pub debit_foreign2: Option<Money>,
    pub invoice_date: NaiveDate,
    pub value_date: NaiveDate,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub currency_rate: Option<f64>,
}

impl LedgerEntryDraft {
    pub fn new(
        charge_id: Uuid,
        owner_id: impl Into<String>,
        currency: Currency,
        invoice_date: NaiveDate,
        value_date: NaiveDate,
    ) -> Self {
        Self {
            charge_id,
            owner_id: owner_id.into(),
            currency,
            credit_entity1: None,
            credit_entity2: None,
            debit_entity1: None,
            debit_entity2: None,
            credit_local1: Money::ZERO,
            credit_local2: Money::ZERO,
            debit_local1: Money::ZERO,
            debit_local2: Money::ZERO,
            credit_foreign1: None,
            credit_foreign2: None,
            debit_foreign1: None,
            debit_foreign2: None,
            invoice_date,
            value_date,
            description: None,
            reference: None,
            currency_rate: None,
        }
    }

    /// Adds a credit leg; errors when both credit slots are taken.
    ///
    /// Leg amounts are magnitudes: direction comes from the slot, so a
    /// negative `local` is rejected.
    pub fn credit(
        mut self,
        entity: impl Into<String>,
        local: Money,
        foreign: Option<Money>,
    ) -> Result<Self, EngineError> {
        if local.is_negative() {
            return Err(EngineError::InvalidAmount(
                "credit leg amount must be >= 0".to_string(),
            ));
        }
        if self.credit_entity1.is_none() {
            self.credit_entity1 = Some(entity.into());
            self.credit_local1 = local;
            self.credit_foreign1 = foreign;
        } else if self.credit_entity2.is_none() {
            self.credit_entity2 = Some(entity.into());
            self.credit_local2 = local;
            self.credit_foreign2 = foreign;
        } else {
            return Err(EngineError::UnbalancedEntry(format!(
                "charge {}: more than two credit legs",
                self.charge_id
            )));
        }
        Ok(self)
    }

    /// Adds a debit leg; errors when both debit slots are taken.
    pub fn debit(
        mut self,
        entity: impl Into<String>,
        local: Money,
        foreign: Option<Money>,
    ) -> Result<Self, EngineError> {
        if local.is_negative() {
            return Err(EngineError::InvalidAmount(
                "debit leg amount must be >= 0".to_string(),
            ));
        }
        if self.debit_entity1.is_none() {
            self.debit_entity1 = Some(entity.into());
            self.debit_local1 = local;
            self.debit_foreign1 = foreign;
        } else if self.debit_entity2.is_none() {
            self.debit_entity2 = Some(entity.into());
            self.debit_local2 = local;
            self.debit_foreign2 = foreign;
        } else {
            return Err(EngineError::UnbalancedEntry(format!(
                "charge {}: more than two debit legs",
                self.charge_id
            )));
        }
        Ok(self)
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn rate(mut self, rate: f64) -> Self {
        self.currency_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn credit_local_total(&self) -> Money {
        self.credit_local1 + self.credit_local2
    }

    #[must_use]
    pub fn debit_local_total(&self) -> Money {
        self.debit_local1 + self.debit_local2
    }

    /// Flattens the populated slots into legs.
    #[must_use]
    pub fn legs(&self) -> Vec<LedgerLeg<'_>> {
        let mut legs = Vec::with_capacity(4);
        let slots = [
            (&self.credit_entity1, self.credit_local1, self.credit_foreign1, true),
            (&self.credit_entity2, self.credit_local2, self.credit_foreign2, true),
            (&self.debit_entity1, self.debit_local1, self.debit_foreign1, false),
            (&self.debit_entity2, self.debit_local2, self.debit_foreign2, false),
        ];
        for (entity, local, foreign, is_credit) in slots {
            if let Some(entity) = entity.as_deref() {
                legs.push(LedgerLeg {
                    entity,
                    is_credit,
                    local,
                    foreign,
                });
            }
        }
        legs
    }

    /// Hard split-leg invariant, enforced before insertion.
    ///
    /// - declared local credit legs must net against local debit legs
    /// - a leg amount requires its entity (no orphan amounts)
    pub fn validate_shape(&self) -> Result<(), EngineError> {
        if self.credit_entity2.is_none() && !self.credit_local2.is_zero() {
            return Err(EngineError::UnbalancedEntry(format!(
                "charge {}: credit leg 2 has an amount but no entity",
                self.charge_id
            )));
        }
        if self.debit_entity2.is_none() && !self.debit_local2.is_zero() {
            return Err(EngineError::UnbalancedEntry(format!(
                "charge {}: debit leg 2 has an amount but no entity",
                self.charge_id
            )));
        }
        if self.credit_local_total() != self.debit_local_total() {
            return Err(EngineError::UnbalancedEntry(format!(
                "charge {}: credit {} != debit {}",
                self.charge_id,
                self.credit_local_total(),
                self.debit_local_total()
            )));
        }
        Ok(())
    }
}

/// Balance report for one charge's entries.
///
/// Advisory for freshly generated entries (operators reconcile manually on
/// imbalance), informational for locked charges whose stored entries are
/// trusted as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub is_balanced: bool,
    /// Counterparty businesses whose local credit and debit do not cancel.
    pub unbalanced_entities: Vec<String>,
    /// Total local credit minus total local debit across all currencies.
    pub balance_sum: Money,
}

/// Checks that, per currency, local credits equal local debits across the
/// entries, and reports counterparty businesses that do not net to zero.
#[must_use]
pub fn validate_balance(entries: &[LedgerEntryDraft]) -> BalanceReport {
    use std::collections::BTreeMap;

    let mut per_currency: BTreeMap<Currency, Money> = BTreeMap::new();
    let mut per_entity: BTreeMap<&str, Money> = BTreeMap::new();

    for entry in entries {
        for leg in entry.legs() {
            let signed = if leg.is_credit { leg.local } else { -leg.local };
            *per_currency.entry(entry.currency).or_default() += signed;
            *per_entity.entry(leg.entity).or_default() += signed;
        }
    }

    let balance_sum = per_currency.values().copied().sum();
    let is_balanced = per_currency.values().all(|net| net.is_zero());
    let unbalanced_entities: Vec<String> = per_entity
        .iter()
        .filter(|(entity, net)| !accounts::is_internal(entity) && !net.is_zero())
        .map(|(entity, _)| (*entity).to_string())
        .collect();

    BalanceReport {
        is_balanced,
        unbalanced_entities,
        balance_sum,
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub charge_id: String,
    pub owner_id: String,
    pub currency: String,
    pub credit_entity1: Option<String>,
    pub credit_entity2: Option<String>,
    pub debit_entity1: Option<String>,
    pub debit_entity2: Option<String>,
    pub credit_local_minor1: i64,
    pub credit_local_minor2: i64,
    pub debit_local_minor1: i64,
    pub debit_local_minor2: i64,
    pub credit_foreign_minor1: Option<i64>,
    pub credit_foreign_minor2: Option<i64>,
    pub debit_foreign_minor1: Option<i64>,
    pub debit_foreign_minor2: Option<i64>,
    pub invoice_date: Date,
    pub value_date: Date,
    pub description: Option<String>,
    pub reference: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub currency_rate: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charges::Entity",
        from = "Column::ChargeId",
        to = "super::charges::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Charges,
}

impl Related<super::charges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntryDraft> for ActiveModel {
    fn from(entry: &LedgerEntryDraft) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            charge_id: ActiveValue::Set(entry.charge_id.to_string()),
            owner_id: ActiveValue::Set(entry.owner_id.clone()),
            currency: ActiveValue::Set(entry.currency.code().to_string()),
            credit_entity1: ActiveValue::Set(entry.credit_entity1.clone()),
            credit_entity2: ActiveValue::Set(entry.credit_entity2.clone()),
            debit_entity1: ActiveValue::Set(entry.debit_entity1.clone()),
            debit_entity2: ActiveValue::Set(entry.debit_entity2.clone()),
            credit_local_minor1: ActiveValue::Set(entry.credit_local1.minor()),
            credit_local_minor2: ActiveValue::Set(entry.credit_local2.minor()),
            debit_local_minor1: ActiveValue::Set(entry.debit_local1.minor()),
            debit_local_minor2: ActiveValue::Set(entry.debit_local2.minor()),
            credit_foreign_minor1: ActiveValue::Set(entry.credit_foreign1.map(Money::minor)),
            credit_foreign_minor2: ActiveValue::Set(entry.credit_foreign2.map(Money::minor)),
            debit_foreign_minor1: ActiveValue::Set(entry.debit_foreign1.map(Money::minor)),
            debit_foreign_minor2: ActiveValue::Set(entry.debit_foreign2.map(Money::minor)),
            invoice_date: ActiveValue::Set(entry.invoice_date),
            value_date: ActiveValue::Set(entry.value_date),
            description: ActiveValue::Set(entry.description.clone()),
            reference: ActiveValue::Set(entry.reference.clone()),
            currency_rate: ActiveValue::Set(entry.currency_rate),
        }
    }
}

impl TryFrom<Model> for LedgerEntryDraft {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            charge_id: Uuid::parse_str(&model.charge_id)
                .map_err(|_| EngineError::InvalidId("invalid charge id".to_string()))?,
            owner_id: model.owner_id,
            currency: Currency::try_from(model.currency.as_str())?,
            credit_entity1: model.credit_entity1,
            credit_entity2: model.credit_entity2,
            debit_entity1: model.debit_entity1,
            debit_entity2: model.debit_entity2,
            credit_local1: Money::new(model.credit_local_minor1),
            credit_local2: Money::new(model.credit_local_minor2),
            debit_local1: Money::new(model.debit_local_minor1),
            debit_local2: Money::new(model.debit_local_minor2),
            credit_foreign1: model.credit_foreign_minor1.map(Money::new),
            credit_foreign2: model.credit_foreign_minor2.map(Money::new),
            debit_foreign1: model.debit_foreign_minor1.map(Money::new),
            debit_foreign2: model.debit_foreign_minor2.map(Money::new),
            invoice_date: model.invoice_date,
            value_date: model.value_date,
            description: model.description,
            reference: model.reference,
            currency_rate: model.currency_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft() -> LedgerEntryDraft {
        LedgerEntryDraft::new(
            Uuid::new_v4(),
            "owner-1",
            Currency::Ils,
            date("2024-01-10"),
            date("2024-01-10"),
        )
    }

    #[test]
    fn split_legs_fill_in_order_and_overflow_errors() {
        let entry = draft()
            .credit("a", Money::new(100), None)
            .unwrap()
            .credit("b", Money::new(50), None)
            .unwrap();
        assert_eq!(entry.credit_entity1.as_deref(), Some("a"));
        assert_eq!(entry.credit_entity2.as_deref(), Some("b"));
        assert!(entry.credit("c", Money::new(1), None).is_err());
    }

    #[test]
    fn shape_requires_local_credit_debit_parity() {
        let entry = draft()
            .credit("a", Money::new(100), None)
            .unwrap()
            .debit("b", Money::new(90), None)
            .unwrap();
        assert!(entry.validate_shape().is_err());

        let entry = draft()
            .credit("a", Money::new(100), None)
            .unwrap()
            .debit("b", Money::new(100), None)
            .unwrap();
        assert!(entry.validate_shape().is_ok());
    }

    #[test]
    fn balance_report_flags_counterparties_only() {
        let entry = draft()
            .credit("business-1", Money::new(100), None)
            .unwrap()
            .debit(accounts::GENERAL_EXPENSE, Money::new(100), None)
            .unwrap();
        let report = validate_balance(&[entry]);
        assert!(report.is_balanced);
        assert_eq!(report.balance_sum, Money::ZERO);
        // The expense account is internal; the counterparty is not.
        assert_eq!(report.unbalanced_entities, vec!["business-1".to_string()]);
    }
}
