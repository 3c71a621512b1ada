//! Exchange rates and the request-scoped rate cache.
//!
//! Rates are externally sourced and read-only to the engine: one row per
//! `(currency, date)`, giving the conversion factor into the local currency.
//!
//! [`RateCache`] is built per generation request: wanted pairs are
//! deduplicated and fetched in one batched query, then every lookup is
//! served from the map. The cache is never shared across requests; writers
//! call [`RateCache::invalidate`] for the pairs they touch.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sea_orm::{Condition, ConnectionTrait, QueryFilter, entity::prelude::*};

use crate::{Currency, EngineError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub currency: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub rate_date: Date,
    #[sea_orm(column_type = "Double")]
    pub rate_to_local: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Request-scoped, batched exchange-rate lookups.
#[derive(Debug, Default)]
pub struct RateCache {
    rates: HashMap<(Currency, NaiveDate), f64>,
}

impl RateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches every not-yet-cached `(currency, date)` pair in one query.
    ///
    /// Pairs for the local currency are skipped (the rate is identically 1).
    /// A pair with no stored rate simply stays absent; the caller decides
    /// whether that is a per-entry issue or a fatal error.
    pub async fn load<C: ConnectionTrait>(
        &mut self,
        db: &C,
        wanted: impl IntoIterator<Item = (Currency, NaiveDate)>,
    ) -> Result<(), EngineError> {
        let missing: HashSet<(Currency, NaiveDate)> = wanted
            .into_iter()
            .filter(|(currency, _)| !currency.is_local())
            .filter(|pair| !self.rates.contains_key(pair))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let mut condition = Condition::any();
        for (currency, date) in &missing {
            condition = condition.add(
                Condition::all()
                    .add(Column::Currency.eq(currency.code()))
                    .add(Column::RateDate.eq(*date)),
            );
        }

        let models = Entity::find().filter(condition).all(db).await?;
        for model in models {
            let currency = Currency::try_from(model.currency.as_str())?;
            self.rates
                .insert((currency, model.rate_date), model.rate_to_local);
        }
        Ok(())
    }

    /// Rate into local currency for `currency` at `date`.
    #[must_use]
    pub fn rate(&self, currency: Currency, date: NaiveDate) -> Option<f64> {
        if currency.is_local() {
            return Some(1.0);
        }
        self.rates.get(&(currency, date)).copied()
    }

    pub fn insert(&mut self, currency: Currency, date: NaiveDate, rate: f64) {
        self.rates.insert((currency, date), rate);
    }

    /// Drops one cached pair, forcing the next `load` to re-fetch it.
    pub fn invalidate(&mut self, currency: Currency, date: NaiveDate) {
        self.rates.remove(&(currency, date));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_currency_rate_is_one() {
        let cache = RateCache::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(cache.rate(Currency::Ils, date), Some(1.0));
        assert_eq!(cache.rate(Currency::Usd, date), None);
    }

    #[test]
    fn insert_and_invalidate() {
        let mut cache = RateCache::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        cache.insert(Currency::Usd, date, 3.6);
        assert_eq!(cache.rate(Currency::Usd, date), Some(3.6));
        cache.invalidate(Currency::Usd, date);
        assert_eq!(cache.rate(Currency::Usd, date), None);
    }
}
