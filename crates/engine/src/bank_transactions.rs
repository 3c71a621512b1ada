//! Bank transaction primitives.
//!
//! A `BankTransaction` is one bank-side movement attached to a charge.
//! Amounts are signed minor units in the transaction's own currency:
//! positive = money into the account, negative = money out.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money};

/// Which book-keeping account family the bank account belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    #[default]
    Checking,
    Securities,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Securities => "securities",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "securities" => Ok(Self::Securities),
            other => Err(EngineError::InvalidId(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: Uuid,
    pub charge_id: Uuid,
    /// Counterparty business, when the bank feed identified one.
    pub business_id: Option<String>,
    pub amount: Money,
    pub currency: Currency,
    pub value_date: NaiveDate,
    pub event_date: NaiveDate,
    pub account_id: String,
    pub account_kind: AccountKind,
    pub is_conversion: bool,
    pub is_fee: bool,
}

impl BankTransaction {
    pub fn new(
        charge_id: Uuid,
        amount: Money,
        currency: Currency,
        value_date: NaiveDate,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            charge_id,
            business_id: None,
            amount,
            currency,
            value_date,
            event_date: value_date,
            account_id: account_id.into(),
            account_kind: AccountKind::Checking,
            is_conversion: false,
            is_fee: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub charge_id: String,
    pub business_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub value_date: Date,
    pub event_date: Date,
    pub account_id: String,
    pub account_kind: String,
    pub is_conversion: bool,
    pub is_fee: bool,
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

impl From<&BankTransaction> for ActiveModel {
    fn from(tx: &BankTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            charge_id: ActiveValue::Set(tx.charge_id.to_string()),
            business_id: ActiveValue::Set(tx.business_id.clone()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            value_date: ActiveValue::Set(tx.value_date),
            event_date: ActiveValue::Set(tx.event_date),
            account_id: ActiveValue::Set(tx.account_id.clone()),
            account_kind: ActiveValue::Set(tx.account_kind.as_str().to_string()),
            is_conversion: ActiveValue::Set(tx.is_conversion),
            is_fee: ActiveValue::Set(tx.is_fee),
        }
    }
}

impl TryFrom<Model> for BankTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid transaction id".to_string()))?,
            charge_id: Uuid::parse_str(&model.charge_id)
                .map_err(|_| EngineError::InvalidId("invalid charge id".to_string()))?,
            business_id: model.business_id,
            amount: Money::new(model.amount_minor),
            currency: Currency::try_from(model.currency.as_str())?,
            value_date: model.value_date,
            event_date: model.event_date,
            account_id: model.account_id,
            account_kind: AccountKind::try_from(model.account_kind.as_str())?,
            is_conversion: model.is_conversion,
            is_fee: model.is_fee,
        })
    }
}
