//! Salary sub-records.
//!
//! One row per employee per pay month, attached to the charge that pays the
//! salaries. `gross` should equal `net + income_tax + pension`; the ledger
//! generator reports (but does not fix) rows where it does not.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub charge_id: Uuid,
    pub employee_id: String,
    /// Pay month, `YYYY-MM`.
    pub month: String,
    pub gross: Money,
    pub net: Money,
    pub income_tax: Money,
    pub pension: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "salary_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub charge_id: String,
    pub employee_id: String,
    pub month: String,
    pub gross_minor: i64,
    pub net_minor: i64,
    pub income_tax_minor: i64,
    pub pension_minor: i64,
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

impl From<&SalaryRecord> for ActiveModel {
    fn from(record: &SalaryRecord) -> Self {
        Self {
            id: ActiveValue::NotSet,
            charge_id: ActiveValue::Set(record.charge_id.to_string()),
            employee_id: ActiveValue::Set(record.employee_id.clone()),
            month: ActiveValue::Set(record.month.clone()),
            gross_minor: ActiveValue::Set(record.gross.minor()),
            net_minor: ActiveValue::Set(record.net.minor()),
            income_tax_minor: ActiveValue::Set(record.income_tax.minor()),
            pension_minor: ActiveValue::Set(record.pension.minor()),
        }
    }
}

impl TryFrom<Model> for SalaryRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            charge_id: Uuid::parse_str(&model.charge_id)
                .map_err(|_| EngineError::InvalidId("invalid charge id".to_string()))?,
            employee_id: model.employee_id,
            month: model.month,
            gross: Money::new(model.gross_minor),
            net: Money::new(model.net_minor),
            income_tax: Money::new(model.income_tax_minor),
            pension: Money::new(model.pension_minor),
        })
    }
}
