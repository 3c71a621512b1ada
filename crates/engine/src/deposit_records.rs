//! Bank-deposit sub-records.
//!
//! Marks a charge as moving money between a checking account and a closed
//! deposit account. The movement direction comes from the transaction signs;
//! the record names the deposit account the other side lands on.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    pub charge_id: Uuid,
    pub deposit_account_id: String,
    pub is_withdrawal: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deposit_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub charge_id: String,
    pub deposit_account_id: String,
    pub is_withdrawal: bool,
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

impl From<&DepositRecord> for ActiveModel {
    fn from(record: &DepositRecord) -> Self {
        Self {
            id: ActiveValue::NotSet,
            charge_id: ActiveValue::Set(record.charge_id.to_string()),
            deposit_account_id: ActiveValue::Set(record.deposit_account_id.clone()),
            is_withdrawal: ActiveValue::Set(record.is_withdrawal),
        }
    }
}

impl TryFrom<Model> for DepositRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            charge_id: Uuid::parse_str(&model.charge_id)
                .map_err(|_| EngineError::InvalidId("invalid charge id".to_string()))?,
            deposit_account_id: model.deposit_account_id,
            is_withdrawal: model.is_withdrawal,
        })
    }
}
