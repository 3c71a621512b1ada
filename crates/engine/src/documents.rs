//! Document primitives.
//!
//! A `Document` is one accounting document (invoice, receipt, ...) attached
//! to a charge. Amounts are signed minor units in the document's currency:
//! positive = income document issued by the owner, negative = expense
//! document received from a supplier. `vat` carries the VAT portion of the
//! total with the same sign.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Invoice,
    Receipt,
    InvoiceReceipt,
    CreditInvoice,
    Proforma,
    Other,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::InvoiceReceipt => "invoice_receipt",
            Self::CreditInvoice => "credit_invoice",
            Self::Proforma => "proforma",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for DocumentKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "invoice" => Ok(Self::Invoice),
            "receipt" => Ok(Self::Receipt),
            "invoice_receipt" => Ok(Self::InvoiceReceipt),
            "credit_invoice" => Ok(Self::CreditInvoice),
            "proforma" => Ok(Self::Proforma),
            "other" => Ok(Self::Other),
            other => Err(EngineError::InvalidId(format!(
                "invalid document kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub charge_id: Uuid,
    /// Counterparty business the document was issued to/by.
    pub business_id: Option<String>,
    pub amount: Money,
    pub currency: Currency,
    pub date: NaiveDate,
    pub vat: Money,
    pub kind: DocumentKind,
    pub serial: Option<String>,
}

impl Document {
    pub fn new(charge_id: Uuid, amount: Money, currency: Currency, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            charge_id,
            business_id: None,
            amount,
            currency,
            date,
            vat: Money::ZERO,
            kind: DocumentKind::Invoice,
            serial: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub charge_id: String,
    pub business_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub date: Date,
    pub vat_minor: i64,
    pub kind: String,
    pub serial: Option<String>,
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

impl From<&Document> for ActiveModel {
    fn from(doc: &Document) -> Self {
        Self {
            id: ActiveValue::Set(doc.id.to_string()),
            charge_id: ActiveValue::Set(doc.charge_id.to_string()),
            business_id: ActiveValue::Set(doc.business_id.clone()),
            amount_minor: ActiveValue::Set(doc.amount.minor()),
            currency: ActiveValue::Set(doc.currency.code().to_string()),
            date: ActiveValue::Set(doc.date),
            vat_minor: ActiveValue::Set(doc.vat.minor()),
            kind: ActiveValue::Set(doc.kind.as_str().to_string()),
            serial: ActiveValue::Set(doc.serial.clone()),
        }
    }
}

impl TryFrom<Model> for Document {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid document id".to_string()))?,
            charge_id: Uuid::parse_str(&model.charge_id)
                .map_err(|_| EngineError::InvalidId("invalid charge id".to_string()))?,
            business_id: model.business_id,
            amount: Money::new(model.amount_minor),
            currency: Currency::try_from(model.currency.as_str())?,
            date: model.date,
            vat: Money::new(model.vat_minor),
            kind: DocumentKind::try_from(model.kind.as_str())?,
            serial: model.serial,
        })
    }
}
