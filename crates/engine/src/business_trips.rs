//! Business-trip sub-records.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessTrip {
    pub charge_id: Uuid,
    pub employee_id: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Recognized allowance for the whole trip, in local minor units.
    pub allowance: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "business_trips")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub charge_id: String,
    pub employee_id: String,
    pub destination: String,
    pub start_date: Date,
    pub end_date: Date,
    pub allowance_minor: i64,
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

impl From<&BusinessTrip> for ActiveModel {
    fn from(trip: &BusinessTrip) -> Self {
        Self {
            id: ActiveValue::NotSet,
            charge_id: ActiveValue::Set(trip.charge_id.to_string()),
            employee_id: ActiveValue::Set(trip.employee_id.clone()),
            destination: ActiveValue::Set(trip.destination.clone()),
            start_date: ActiveValue::Set(trip.start_date),
            end_date: ActiveValue::Set(trip.end_date),
            allowance_minor: ActiveValue::Set(trip.allowance.minor()),
        }
    }
}

impl TryFrom<Model> for BusinessTrip {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            charge_id: Uuid::parse_str(&model.charge_id)
                .map_err(|_| EngineError::InvalidId("invalid charge id".to_string()))?,
            employee_id: model.employee_id,
            destination: model.destination,
            start_date: model.start_date,
            end_date: model.end_date,
            allowance: Money::new(model.allowance_minor),
        })
    }
}
