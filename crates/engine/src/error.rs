//! The module contains the error the engine can throw.
//!
//! Precondition violations ([`AlreadyMatched`], [`EmptyCharge`],
//! [`MissingRevaluationDate`], [`UnbalancedEntry`]) are fatal to the single
//! charge being processed; batch drivers catch them per charge and keep going.
//!
//! [`AlreadyMatched`]: EngineError::AlreadyMatched
//! [`EmptyCharge`]: EngineError::EmptyCharge
//! [`MissingRevaluationDate`]: EngineError::MissingRevaluationDate
//! [`UnbalancedEntry`]: EngineError::UnbalancedEntry
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("charge {0} is already matched")]
    AlreadyMatched(Uuid),
    #[error("charge {0} has neither transactions nor documents")]
    EmptyCharge(Uuid),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("no designated date in description of charge {0}")]
    MissingRevaluationDate(Uuid),
    #[error("missing record: {0}")]
    MissingRecord(String),
    #[error("unbalanced entry: {0}")]
    UnbalancedEntry(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AlreadyMatched(a), Self::AlreadyMatched(b)) => a == b,
            (Self::EmptyCharge(a), Self::EmptyCharge(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::MissingRevaluationDate(a), Self::MissingRevaluationDate(b)) => a == b,
            (Self::MissingRecord(a), Self::MissingRecord(b)) => a == b,
            (Self::UnbalancedEntry(a), Self::UnbalancedEntry(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
