//! Charge loading and merge execution.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Charge, ChargeWithData, EngineError, ResultEngine, bank_transactions, business_trips, charges,
    deposit_records, dividend_records, documents, ledger, salary_records,
};

use super::{Engine, with_tx};

impl Engine {
    /// Loads one charge with all of its sub-records and derives its kind.
    pub async fn load_charge(&self, charge_id: Uuid) -> ResultEngine<ChargeWithData> {
        load_charge_with_data(&self.database, charge_id).await
    }

    /// Loads every unmatched charge of `owner_id`, both sides, batched.
    ///
    /// Built fresh per call: the pools mutate between reconciliation passes,
    /// so caching them across passes would reconcile against stale data.
    pub async fn load_unmatched(&self, owner_id: &str) -> ResultEngine<Vec<ChargeWithData>> {
        load_unmatched_pool(&self.database, owner_id).await
    }

    /// Re-points every row of `to_delete` onto `to_keep` and removes the
    /// emptied charge.
    pub async fn merge_charges(&self, to_delete: Uuid, to_keep: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            merge_charges_in(&db_tx, to_delete, to_keep).await
        })
    }
}

pub(crate) async fn load_charge_with_data<C: ConnectionTrait>(
    db: &C,
    charge_id: Uuid,
) -> ResultEngine<ChargeWithData> {
    let model = charges::Entity::find_by_id(charge_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("charge not exists".to_string()))?;
    let charge = Charge::try_from(model)?;
    let id = charge_id.to_string();

    let transactions = bank_transactions::Entity::find()
        .filter(bank_transactions::Column::ChargeId.eq(id.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let documents = documents::Entity::find()
        .filter(documents::Column::ChargeId.eq(id.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let salary_records = salary_records::Entity::find()
        .filter(salary_records::Column::ChargeId.eq(id.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let dividend_records = dividend_records::Entity::find()
        .filter(dividend_records::Column::ChargeId.eq(id.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let business_trips = business_trips::Entity::find()
        .filter(business_trips::Column::ChargeId.eq(id.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let deposit_records = deposit_records::Entity::find()
        .filter(deposit_records::Column::ChargeId.eq(id))
        .all(db)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    ChargeWithData::assemble(
        charge,
        transactions,
        documents,
        salary_records,
        dividend_records,
        business_trips,
        deposit_records,
    )
}

pub(crate) async fn load_unmatched_pool<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
) -> ResultEngine<Vec<ChargeWithData>> {
    let charge_models = charges::Entity::find()
        .filter(charges::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?;
    if charge_models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = charge_models.iter().map(|m| m.id.clone()).collect();

    let mut transactions: HashMap<String, Vec<crate::BankTransaction>> = HashMap::new();
    for model in bank_transactions::Entity::find()
        .filter(bank_transactions::Column::ChargeId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        transactions
            .entry(model.charge_id.clone())
            .or_default()
            .push(TryFrom::try_from(model)?);
    }
    let mut documents_by_charge: HashMap<String, Vec<crate::Document>> = HashMap::new();
    for model in documents::Entity::find()
        .filter(documents::Column::ChargeId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        documents_by_charge
            .entry(model.charge_id.clone())
            .or_default()
            .push(TryFrom::try_from(model)?);
    }
    let mut salaries: HashMap<String, Vec<crate::SalaryRecord>> = HashMap::new();
    for model in salary_records::Entity::find()
        .filter(salary_records::Column::ChargeId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        salaries
            .entry(model.charge_id.clone())
            .or_default()
            .push(TryFrom::try_from(model)?);
    }
    let mut dividends: HashMap<String, Vec<crate::DividendRecord>> = HashMap::new();
    for model in dividend_records::Entity::find()
        .filter(dividend_records::Column::ChargeId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        dividends
            .entry(model.charge_id.clone())
            .or_default()
            .push(TryFrom::try_from(model)?);
    }
    let mut trips: HashMap<String, Vec<crate::BusinessTrip>> = HashMap::new();
    for model in business_trips::Entity::find()
        .filter(business_trips::Column::ChargeId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        trips
            .entry(model.charge_id.clone())
            .or_default()
            .push(TryFrom::try_from(model)?);
    }
    let mut deposits: HashMap<String, Vec<crate::DepositRecord>> = HashMap::new();
    for model in deposit_records::Entity::find()
        .filter(deposit_records::Column::ChargeId.is_in(ids))
        .all(db)
        .await?
    {
        deposits
            .entry(model.charge_id.clone())
            .or_default()
            .push(TryFrom::try_from(model)?);
    }

    let mut pool = Vec::with_capacity(charge_models.len());
    for model in charge_models {
        let key = model.id.clone();
        let charge = Charge::try_from(model)?;
        let assembled = ChargeWithData::assemble(
            charge,
            transactions.remove(&key).unwrap_or_default(),
            documents_by_charge.remove(&key).unwrap_or_default(),
            salaries.remove(&key).unwrap_or_default(),
            dividends.remove(&key).unwrap_or_default(),
            trips.remove(&key).unwrap_or_default(),
            deposits.remove(&key).unwrap_or_default(),
        );
        match assembled {
            Ok(charge) if charge.unmatched_side().is_ok() => pool.push(charge),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(charge = %key, error = %err, "skipping charge in unmatched pool");
            }
        }
    }
    Ok(pool)
}

pub(crate) async fn merge_charges_in<C: ConnectionTrait>(
    db: &C,
    to_delete: Uuid,
    to_keep: Uuid,
) -> ResultEngine<()> {
    if to_delete == to_keep {
        return Err(EngineError::InvalidId(
            "cannot merge a charge into itself".to_string(),
        ));
    }
    let keep_model = charges::Entity::find_by_id(to_keep.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("charge not exists".to_string()))?;
    let delete_model = charges::Entity::find_by_id(to_delete.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("charge not exists".to_string()))?;
    if keep_model.owner_id != delete_model.owner_id {
        return Err(EngineError::InvalidId(
            "cannot merge charges across owners".to_string(),
        ));
    }

    let old = to_delete.to_string();
    let new = to_keep.to_string();
    bank_transactions::Entity::update_many()
        .col_expr(bank_transactions::Column::ChargeId, Expr::value(new.clone()))
        .filter(bank_transactions::Column::ChargeId.eq(old.clone()))
        .exec(db)
        .await?;
    documents::Entity::update_many()
        .col_expr(documents::Column::ChargeId, Expr::value(new.clone()))
        .filter(documents::Column::ChargeId.eq(old.clone()))
        .exec(db)
        .await?;
    salary_records::Entity::update_many()
        .col_expr(salary_records::Column::ChargeId, Expr::value(new.clone()))
        .filter(salary_records::Column::ChargeId.eq(old.clone()))
        .exec(db)
        .await?;
    dividend_records::Entity::update_many()
        .col_expr(dividend_records::Column::ChargeId, Expr::value(new.clone()))
        .filter(dividend_records::Column::ChargeId.eq(old.clone()))
        .exec(db)
        .await?;
    business_trips::Entity::update_many()
        .col_expr(business_trips::Column::ChargeId, Expr::value(new.clone()))
        .filter(business_trips::Column::ChargeId.eq(old.clone()))
        .exec(db)
        .await?;
    deposit_records::Entity::update_many()
        .col_expr(deposit_records::Column::ChargeId, Expr::value(new.clone()))
        .filter(deposit_records::Column::ChargeId.eq(old.clone()))
        .exec(db)
        .await?;
    ledger::Entity::update_many()
        .col_expr(ledger::Column::ChargeId, Expr::value(new))
        .filter(ledger::Column::ChargeId.eq(old.clone()))
        .exec(db)
        .await?;

    charges::Entity::delete_by_id(old).exec(db).await?;
    Ok(())
}
