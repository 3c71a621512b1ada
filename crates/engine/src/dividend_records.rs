//! Dividend sub-records.
//!
//! One row per shareholder distribution. `amount` is the gross dividend;
//! `withholding` is the tax withheld at source (same sign).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendRecord {
    pub charge_id: Uuid,
    pub shareholder_id: String,
    pub amount: Money,
    pub withholding: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dividend_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub charge_id: String,
    pub shareholder_id: String,
    pub amount_minor: i64,
    pub withholding_minor: i64,
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

impl From<&DividendRecord> for ActiveModel {
    fn from(record: &DividendRecord) -> Self {
        Self {
            id: ActiveValue::NotSet,
            charge_id: ActiveValue::Set(record.charge_id.to_string()),
            shareholder_id: ActiveValue::Set(record.shareholder_id.clone()),
            amount_minor: ActiveValue::Set(record.amount.minor()),
            withholding_minor: ActiveValue::Set(record.withholding.minor()),
        }
    }
}

impl TryFrom<Model> for DividendRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            charge_id: Uuid::parse_str(&model.charge_id)
                .map_err(|_| EngineError::InvalidId("invalid charge id".to_string()))?,
            shareholder_id: model.shareholder_id,
            amount: Money::new(model.amount_minor),
            withholding: Money::new(model.withholding_minor),
        })
    }
}
