//! Confidence scoring between one transaction-side and one document-side
//! charge.
//!
//! Every signal is a named three-tier score: the evidence either confirms
//! the pairing, says nothing, or contradicts it. The combined score is a
//! weighted mean of the tiers; the weights are calibrated against the
//! auto-accept threshold so that only fully confirmed pairings clear it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{ChargeSide, ChargeWithData, Currency, Money};

/// Weight of the business-identity signal in the combined score.
pub const BUSINESS_WEIGHT: f64 = 0.45;
/// Weight of the amount signal in the combined score.
pub const AMOUNT_WEIGHT: f64 = 0.35;
/// Weight of the date signal in the combined score.
pub const DATE_WEIGHT: f64 = 0.20;

/// Days two dates may differ and still count as the same business event.
pub const DATE_TOLERANCE_DAYS: i64 = 1;

/// Three-tier signal confidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalScore {
    /// The signal confirms the pairing.
    Exact,
    /// Evidence is missing on at least one side; neither confirms nor denies.
    Unknown,
    /// The signal contradicts the pairing.
    Mismatch,
}

impl SignalScore {
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Exact => 1.0,
            Self::Unknown => 0.5,
            Self::Mismatch => 0.2,
        }
    }
}

/// The per-signal scores backing one [`MatchResult`](super::MatchResult).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSignals {
    pub business: SignalScore,
    pub amount: SignalScore,
    pub date: SignalScore,
}

impl MatchSignals {
    /// Weighted combination, always in `[0, 1]`.
    #[must_use]
    pub fn combined(self) -> f64 {
        BUSINESS_WEIGHT * self.business.value()
            + AMOUNT_WEIGHT * self.amount.value()
            + DATE_WEIGHT * self.date.value()
    }
}

/// Business-identity confidence.
///
/// Case-sensitive equality; an empty string is a valid identity distinct
/// from a missing one. Symmetric in argument order.
#[must_use]
pub fn business_score(a: Option<&str>, b: Option<&str>) -> SignalScore {
    match (a, b) {
        (Some(a), Some(b)) if a == b => SignalScore::Exact,
        (Some(_), Some(_)) => SignalScore::Mismatch,
        _ => SignalScore::Unknown,
    }
}

/// Amount confidence over absolute side totals in minor units.
///
/// Totals in different (or mixed) currencies can neither confirm nor deny
/// the pairing without a rate lookup, so they score as unknown.
#[must_use]
pub fn amount_score(
    a: (Money, Option<Currency>),
    b: (Money, Option<Currency>),
) -> SignalScore {
    match (a.1, b.1) {
        (Some(ca), Some(cb)) if ca == cb => {
            if a.0 == b.0 {
                SignalScore::Exact
            } else {
                SignalScore::Mismatch
            }
        }
        _ => SignalScore::Unknown,
    }
}

/// Date confidence: within [`DATE_TOLERANCE_DAYS`] is exact.
#[must_use]
pub fn date_score(a: Option<NaiveDate>, b: Option<NaiveDate>) -> SignalScore {
    match (a, b) {
        (Some(a), Some(b)) => {
            if (a - b).num_days().abs() <= DATE_TOLERANCE_DAYS {
                SignalScore::Exact
            } else {
                SignalScore::Mismatch
            }
        }
        _ => SignalScore::Unknown,
    }
}

/// Scores the pairing of `a`'s populated side against `b`'s.
#[must_use]
pub fn score_charges(
    a: &ChargeWithData,
    side_a: ChargeSide,
    b: &ChargeWithData,
    side_b: ChargeSide,
) -> MatchSignals {
    MatchSignals {
        business: business_score(a.side_business_id(side_a), b.side_business_id(side_b)),
        amount: amount_score(a.side_total(side_a), b.side_total(side_b)),
        date: date_score(a.side_date(side_a), b.side_date(side_b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_three_tiers() {
        assert_eq!(business_score(Some("B1"), Some("B1")), SignalScore::Exact);
        assert_eq!(business_score(Some("B1"), Some("B2")), SignalScore::Mismatch);
        assert_eq!(business_score(Some("B1"), None), SignalScore::Unknown);
        assert_eq!(business_score(None, None), SignalScore::Unknown);
    }

    #[test]
    fn business_empty_string_is_a_value() {
        assert_eq!(business_score(Some(""), Some("")), SignalScore::Exact);
        assert_eq!(business_score(Some(""), Some("B1")), SignalScore::Mismatch);
        assert_eq!(business_score(Some(""), None), SignalScore::Unknown);
    }

    #[test]
    fn business_is_case_sensitive() {
        assert_eq!(business_score(Some("b1"), Some("B1")), SignalScore::Mismatch);
    }

    #[test]
    fn signals_are_symmetric() {
        let cases = [
            (Some("B1"), Some("B1")),
            (Some("B1"), Some("B2")),
            (Some("B1"), None),
        ];
        for (a, b) in cases {
            assert_eq!(business_score(a, b), business_score(b, a));
        }

        let usd = Some(Currency::Usd);
        let eur = Some(Currency::Eur);
        let amounts = [
            ((Money::new(100), usd), (Money::new(100), usd)),
            ((Money::new(100), usd), (Money::new(200), usd)),
            ((Money::new(100), usd), (Money::new(100), eur)),
        ];
        for (a, b) in amounts {
            assert_eq!(amount_score(a, b), amount_score(b, a));
        }

        let d1 = NaiveDate::from_ymd_opt(2024, 1, 10);
        let d2 = NaiveDate::from_ymd_opt(2024, 2, 10);
        for (a, b) in [(d1, d1), (d1, d2), (d1, None)] {
            assert_eq!(date_score(a, b), date_score(b, a));
        }
    }

    #[test]
    fn date_tolerance_window() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 10);
        let next = NaiveDate::from_ymd_opt(2024, 1, 11);
        let far = NaiveDate::from_ymd_opt(2024, 1, 20);
        assert_eq!(date_score(base, base), SignalScore::Exact);
        assert_eq!(date_score(base, next), SignalScore::Exact);
        assert_eq!(date_score(base, far), SignalScore::Mismatch);
    }

    #[test]
    fn combined_stays_in_unit_interval() {
        let all = [SignalScore::Exact, SignalScore::Unknown, SignalScore::Mismatch];
        for business in all {
            for amount in all {
                for date in all {
                    let combined = MatchSignals {
                        business,
                        amount,
                        date,
                    }
                    .combined();
                    assert!((0.0..=1.0).contains(&combined));
                }
            }
        }
    }

    #[test]
    fn only_full_confirmation_reaches_the_auto_threshold() {
        let perfect = MatchSignals {
            business: SignalScore::Exact,
            amount: SignalScore::Exact,
            date: SignalScore::Exact,
        };
        assert!(perfect.combined() >= crate::matching::AUTO_MATCH_THRESHOLD);

        let date_unknown = MatchSignals {
            date: SignalScore::Unknown,
            ..perfect
        };
        assert!(date_unknown.combined() < crate::matching::AUTO_MATCH_THRESHOLD);
    }
}
