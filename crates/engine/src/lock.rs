//! Historical ledger locking.
//!
//! Process-wide admin configuration, injected through the engine builder and
//! consulted per charge: a locked charge's stored entries are read verbatim,
//! never regenerated, regardless of what its transactions and documents look
//! like today.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ChargeWithData;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Charges whose earliest accounting date falls strictly before this
    /// cutoff are frozen.
    pub lock_before: Option<NaiveDate>,
    /// Explicitly frozen charges, independent of date.
    #[serde(default)]
    pub locked_charges: HashSet<Uuid>,
}

impl LockConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lock_before(mut self, cutoff: NaiveDate) -> Self {
        self.lock_before = Some(cutoff);
        self
    }

    #[must_use]
    pub fn lock_charge(mut self, charge_id: Uuid) -> Self {
        self.locked_charges.insert(charge_id);
        self
    }
}

/// Pure lock predicate.
///
/// A charge with no dated rows (e.g. a revaluation charge before its entries
/// exist) can only be locked through the explicit set.
#[must_use]
pub fn is_locked(charge: &ChargeWithData, config: &LockConfig) -> bool {
    if config.locked_charges.contains(&charge.id()) {
        return true;
    }
    match (config.lock_before, charge.accounting_date()) {
        (Some(cutoff), Some(date)) => date < cutoff,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserializes_from_admin_json() {
        let config: LockConfig = serde_json::from_str(
            r#"{
                "lock_before": "2024-01-01",
                "locked_charges": ["6f2f3f4e-8a7b-4c2d-9e1f-0a1b2c3d4e5f"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.lock_before, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.locked_charges.len(), 1);
    }

    #[test]
    fn locked_charges_default_to_empty() {
        let config: LockConfig = serde_json::from_str(r#"{ "lock_before": null }"#).unwrap();
        assert_eq!(config, LockConfig::default());
    }
}
