//! Charge primitives.
//!
//! A `Charge` groups zero-or-more bank transactions and zero-or-more
//! documents under one business event. A charge is *matched* when it carries
//! at least one transaction **and** at least one document; an unmatched
//! charge has exactly one side populated.
//!
//! The charge type is never stored: it is derived once at load time from
//! which sub-records are populated, and the ledger dispatcher matches on the
//! resulting [`ChargeKind`] exhaustively.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BankTransaction, BusinessTrip, Currency, DepositRecord, DividendRecord, Document, EngineError,
    Money, SalaryRecord, bank_transactions::AccountKind, ledger::accounts,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: Uuid,
    /// The business whose books this charge affects.
    pub owner_id: String,
    pub user_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Charge {
    pub fn new(owner_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            user_description: None,
            created_at,
        }
    }
}

/// Which half of a charge is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeSide {
    Transactions,
    Documents,
}

impl ChargeSide {
    /// The side an auto-match candidate must come from.
    #[must_use]
    pub const fn complement(self) -> ChargeSide {
        match self {
            Self::Transactions => Self::Documents,
            Self::Documents => Self::Transactions,
        }
    }
}

/// Charge type tag, derived from populated sub-records at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    Common,
    Conversion,
    Salary,
    InternalTransfer,
    Dividend,
    BusinessTrip,
    MonthlyVat,
    BankDeposit,
    ForeignSecurities,
    Revaluation,
}

/// A charge together with everything hanging off it.
///
/// Built fresh from current DB state on every reconciliation or generation
/// pass; never cached across passes, because the transaction/document pools
/// mutate between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChargeWithData {
    pub charge: Charge,
    pub transactions: Vec<BankTransaction>,
    pub documents: Vec<Document>,
    pub salary_records: Vec<SalaryRecord>,
    pub dividend_records: Vec<DividendRecord>,
    pub business_trips: Vec<BusinessTrip>,
    pub deposit_records: Vec<DepositRecord>,
    pub kind: ChargeKind,
}

impl ChargeWithData {
    /// Assembles the aggregate and derives its [`ChargeKind`].
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        charge: Charge,
        transactions: Vec<BankTransaction>,
        documents: Vec<Document>,
        salary_records: Vec<SalaryRecord>,
        dividend_records: Vec<DividendRecord>,
        business_trips: Vec<BusinessTrip>,
        deposit_records: Vec<DepositRecord>,
    ) -> Result<Self, EngineError> {
        let kind = derive_kind(
            &charge,
            &transactions,
            &documents,
            &salary_records,
            &dividend_records,
            &business_trips,
            &deposit_records,
        )?;
        Ok(Self {
            charge,
            transactions,
            documents,
            salary_records,
            dividend_records,
            business_trips,
            deposit_records,
            kind,
        })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.charge.id
    }

    /// A charge is matched when both sides are populated.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        !self.transactions.is_empty() && !self.documents.is_empty()
    }

    /// The single populated side of an unmatched charge.
    ///
    /// Errors on both sides populated ([`EngineError::AlreadyMatched`]) or
    /// neither ([`EngineError::EmptyCharge`]); both are precondition
    /// violations for matching, not recoverable states.
    pub fn unmatched_side(&self) -> Result<ChargeSide, EngineError> {
        match (self.transactions.is_empty(), self.documents.is_empty()) {
            (false, false) => Err(EngineError::AlreadyMatched(self.charge.id)),
            (true, true) => Err(EngineError::EmptyCharge(self.charge.id)),
            (false, true) => Ok(ChargeSide::Transactions),
            (true, false) => Ok(ChargeSide::Documents),
        }
    }

    /// First counterparty business id found on the given side, if any.
    #[must_use]
    pub fn side_business_id(&self, side: ChargeSide) -> Option<&str> {
        match side {
            ChargeSide::Transactions => self
                .transactions
                .iter()
                .find_map(|t| t.business_id.as_deref()),
            ChargeSide::Documents => self.documents.iter().find_map(|d| d.business_id.as_deref()),
        }
    }

    /// Absolute total of the given side, with its currency.
    ///
    /// Currency is `None` when the side mixes currencies (the amount signal
    /// then can neither confirm nor deny a match).
    #[must_use]
    pub fn side_total(&self, side: ChargeSide) -> (Money, Option<Currency>) {
        let mut total = Money::ZERO;
        let mut currency: Option<Currency> = None;
        let mut mixed = false;
        let mut fold = |amount: Money, cur: Currency| {
            total += amount.abs();
            match currency {
                None => currency = Some(cur),
                Some(existing) if existing != cur => mixed = true,
                Some(_) => {}
            }
        };
        match side {
            ChargeSide::Transactions => {
                for tx in &self.transactions {
                    fold(tx.amount, tx.currency);
                }
            }
            ChargeSide::Documents => {
                for doc in &self.documents {
                    fold(doc.amount, doc.currency);
                }
            }
        }
        (total, if mixed { None } else { currency })
    }

    /// Earliest date on the given side.
    #[must_use]
    pub fn side_date(&self, side: ChargeSide) -> Option<NaiveDate> {
        match side {
            ChargeSide::Transactions => self.transactions.iter().map(|t| t.value_date).min(),
            ChargeSide::Documents => self.documents.iter().map(|d| d.date).min(),
        }
    }

    /// Earliest accounting date across both sides; the lock gate compares
    /// this against the cutoff.
    #[must_use]
    pub fn accounting_date(&self) -> Option<NaiveDate> {
        let tx = self.transactions.iter().map(|t| t.value_date).min();
        let doc = self.documents.iter().map(|d| d.date).min();
        match (tx, doc) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn derive_kind(
    charge: &Charge,
    transactions: &[BankTransaction],
    documents: &[Document],
    salary_records: &[SalaryRecord],
    dividend_records: &[DividendRecord],
    business_trips: &[BusinessTrip],
    deposit_records: &[DepositRecord],
) -> Result<ChargeKind, EngineError> {
    // Sub-record tables decide first: they are explicit operator statements
    // about what the charge is.
    if !salary_records.is_empty() {
        return Ok(ChargeKind::Salary);
    }
    if !dividend_records.is_empty() {
        return Ok(ChargeKind::Dividend);
    }
    if !business_trips.is_empty() {
        return Ok(ChargeKind::BusinessTrip);
    }
    if !deposit_records.is_empty() {
        return Ok(ChargeKind::BankDeposit);
    }

    if transactions.is_empty() && documents.is_empty() {
        if is_revaluation_description(charge.user_description.as_deref()) {
            return Ok(ChargeKind::Revaluation);
        }
        return Err(EngineError::EmptyCharge(charge.id));
    }

    let conversion_currencies: std::collections::HashSet<Currency> = transactions
        .iter()
        .filter(|t| t.is_conversion)
        .map(|t| t.currency)
        .collect();
    if conversion_currencies.len() >= 2 {
        return Ok(ChargeKind::Conversion);
    }

    if transactions
        .iter()
        .any(|t| t.account_kind == AccountKind::Securities)
    {
        return Ok(ChargeKind::ForeignSecurities);
    }

    let business_ids: Vec<&str> = transactions
        .iter()
        .filter_map(|t| t.business_id.as_deref())
        .chain(documents.iter().filter_map(|d| d.business_id.as_deref()))
        .collect();
    if !business_ids.is_empty()
        && business_ids.iter().all(|id| *id == accounts::VAT_AUTHORITY)
    {
        return Ok(ChargeKind::MonthlyVat);
    }

    // Two opposite-signed movements between own accounts, no documents and
    // no counterparty: money shuffled within the business.
    if documents.is_empty()
        && transactions.len() == 2
        && business_ids.is_empty()
        && transactions[0].amount.is_positive() != transactions[1].amount.is_positive()
    {
        return Ok(ChargeKind::InternalTransfer);
    }

    Ok(ChargeKind::Common)
}

fn is_revaluation_description(description: Option<&str>) -> bool {
    description.is_some_and(|d| d.to_ascii_lowercase().contains("revaluation"))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub user_description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_transactions::Entity")]
    BankTransactions,
    #[sea_orm(has_many = "super::documents::Entity")]
    Documents,
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerEntries,
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Charge> for ActiveModel {
    fn from(charge: &Charge) -> Self {
        Self {
            id: ActiveValue::Set(charge.id.to_string()),
            owner_id: ActiveValue::Set(charge.owner_id.clone()),
            user_description: ActiveValue::Set(charge.user_description.clone()),
            created_at: ActiveValue::Set(charge.created_at),
        }
    }
}

impl TryFrom<Model> for Charge {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid charge id".to_string()))?,
            owner_id: model.owner_id,
            user_description: model.user_description,
            created_at: model.created_at,
        })
    }
}
