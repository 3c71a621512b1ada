//! Financial reconciliation engine.
//!
//! Two jobs share one invariant discipline here:
//!
//! - **Matching**: pairing unmatched bank-transaction charges with unmatched
//!   document charges through confidence scoring, with a hard refusal to
//!   auto-merge ambiguous candidates.
//! - **Ledgering**: compiling every charge, whatever its business type, into
//!   a balanced double-entry ledger with multi-currency conversion,
//!   historical locking and idempotent regeneration.
//!
//! The pure pipeline (scoring, candidate ranking, merge direction, balance
//! validation) is usable without a database; the [`Engine`] wires it to
//! sea-orm persistence, one transaction per operation.

pub use bank_transactions::{AccountKind, BankTransaction};
pub use business_trips::BusinessTrip;
pub use charges::{Charge, ChargeKind, ChargeSide, ChargeWithData};
pub use currency::Currency;
pub use deposit_records::DepositRecord;
pub use dividend_records::DividendRecord;
pub use documents::{Document, DocumentKind};
pub use error::EngineError;
pub use generators::{GeneratedLedger, LedgerIssue};
pub use ledger::{BalanceReport, LedgerEntryDraft, LedgerLeg, accounts, validate_balance};
pub use lock::{LockConfig, is_locked};
pub use matching::{
    AUTO_MATCH_THRESHOLD, AMOUNT_WEIGHT, AutoMatchOutcome, AutoMatchStatus, BUSINESS_WEIGHT,
    DATE_TOLERANCE_DAYS, DATE_WEIGHT, FindOptions, MatchResult, MatchSignals, SignalScore,
    amount_score, business_score, date_score, determine_merge_direction, find_matches,
    process_charge_for_auto_match, score_charges,
};
pub use money::Money;
pub use ops::{AutoMatchReport, Engine, EngineBuilder, GenerateOptions};
pub use rates::RateCache;
pub use salary_records::SalaryRecord;

pub mod bank_transactions;
pub mod business_trips;
pub mod charges;
mod currency;
pub mod deposit_records;
pub mod dividend_records;
pub mod documents;
mod error;
mod generators;
pub mod ledger;
mod lock;
mod matching;
mod money;
mod ops;
pub mod rates;
pub mod salary_records;

type ResultEngine<T> = Result<T, EngineError>;
