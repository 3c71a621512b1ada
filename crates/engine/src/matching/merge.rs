//! Merge-direction resolution.

use crate::ChargeWithData;

/// Decides which of two charges survives a merge.
///
/// Returns `(to_delete, to_keep)`. Priority rules, first match wins:
///
/// 1. Exactly one is already matched: the matched charge is kept. Matched
///    charges already carry generated ledger history; an unmatched charge is
///    absorbed into them, never the reverse.
/// 2. Exactly one has transactions: the transaction-bearing charge is kept.
///    Transactions are the anchor of record; documents attach to them.
/// 3. Otherwise the first argument is kept, so repeated runs over the same
///    pair resolve identically.
///
/// Pure, total: always returns an ordered pair, never fails.
#[must_use]
pub fn determine_merge_direction<'a>(
    a: &'a ChargeWithData,
    b: &'a ChargeWithData,
) -> (&'a ChargeWithData, &'a ChargeWithData) {
    match (a.is_matched(), b.is_matched()) {
        (true, false) => return (b, a),
        (false, true) => return (a, b),
        _ => {}
    }

    match (a.transactions.is_empty(), b.transactions.is_empty()) {
        (false, true) => (b, a),
        (true, false) => (a, b),
        _ => (b, a),
    }
}
