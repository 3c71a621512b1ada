use chrono::{NaiveDate, Utc};

use engine::{
    AutoMatchStatus, BankTransaction, Charge, ChargeSide, ChargeWithData, Currency, Document,
    EngineError, FindOptions, Money, SignalScore, determine_merge_direction, find_matches,
    process_charge_for_auto_match, score_charges,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx_charge(
    business: Option<&str>,
    amount_minor: i64,
    currency: Currency,
    value_date: &str,
) -> ChargeWithData {
    let charge = Charge::new("owner-1", Utc::now());
    let mut tx = BankTransaction::new(
        charge.id,
        Money::new(amount_minor),
        currency,
        date(value_date),
        "acc-1",
    );
    tx.business_id = business.map(String::from);
    ChargeWithData::assemble(charge, vec![tx], Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new())
        .unwrap()
}

fn doc_charge(
    business: Option<&str>,
    amount_minor: i64,
    currency: Currency,
    doc_date: &str,
) -> ChargeWithData {
    let charge = Charge::new("owner-1", Utc::now());
    let mut doc = Document::new(charge.id, Money::new(amount_minor), currency, date(doc_date));
    doc.business_id = business.map(String::from);
    ChargeWithData::assemble(charge, Vec::new(), vec![doc], Vec::new(), Vec::new(), Vec::new(), Vec::new())
        .unwrap()
}

fn matched_charge() -> ChargeWithData {
    let charge = Charge::new("owner-1", Utc::now());
    let tx = BankTransaction::new(
        charge.id,
        Money::new(100_00),
        Currency::Ils,
        date("2024-01-10"),
        "acc-1",
    );
    let doc = Document::new(charge.id, Money::new(100_00), Currency::Ils, date("2024-01-10"));
    ChargeWithData::assemble(charge, vec![tx], vec![doc], Vec::new(), Vec::new(), Vec::new(), Vec::new())
        .unwrap()
}

#[test]
fn exact_pair_scores_full_confidence_and_auto_matches() {
    let source = tx_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let candidate = doc_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");

    let signals = score_charges(
        &source,
        ChargeSide::Transactions,
        &candidate,
        ChargeSide::Documents,
    );
    assert_eq!(signals.business, SignalScore::Exact);
    assert_eq!(signals.amount, SignalScore::Exact);
    assert_eq!(signals.date, SignalScore::Exact);
    assert!((signals.combined() - 1.0).abs() < f64::EPSILON);

    let outcome =
        process_charge_for_auto_match(&source, std::slice::from_ref(&candidate), "tester").unwrap();
    assert_eq!(outcome.status, AutoMatchStatus::Matched);
    let result = outcome.matched.unwrap();
    assert_eq!(result.candidate_charge_id, candidate.id());
    assert!((result.score - 1.0).abs() < f64::EPSILON);
}

#[test]
fn scoring_is_symmetric_across_sides() {
    let tx = tx_charge(Some("B1"), 250_00, Currency::Eur, "2024-02-01");
    let doc = doc_charge(Some("B2"), 250_00, Currency::Eur, "2024-02-20");

    let forward = score_charges(&tx, ChargeSide::Transactions, &doc, ChargeSide::Documents);
    let backward = score_charges(&doc, ChargeSide::Documents, &tx, ChargeSide::Transactions);
    assert_eq!(forward, backward);
}

#[test]
fn auto_match_refuses_ambiguity() {
    let source = tx_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let twin_a = doc_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let twin_b = doc_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");

    let outcome =
        process_charge_for_auto_match(&source, &[twin_a, twin_b], "tester").unwrap();
    assert_eq!(outcome.status, AutoMatchStatus::Skipped);
    assert!(outcome.matched.is_none());
    assert!(outcome.reason.contains("refusing"));
}

#[test]
fn auto_match_picks_the_single_confident_candidate() {
    let source = tx_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let perfect = doc_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let wrong_business = doc_charge(Some("B9"), 100_00, Currency::Usd, "2024-01-10");

    let outcome = process_charge_for_auto_match(
        &source,
        &[wrong_business, perfect.clone()],
        "tester",
    )
    .unwrap();
    assert_eq!(outcome.status, AutoMatchStatus::Matched);
    assert_eq!(
        outcome.matched.unwrap().candidate_charge_id,
        perfect.id()
    );
}

#[test]
fn auto_match_reports_no_match_with_the_best_score() {
    let source = tx_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let near_miss = doc_charge(Some("B1"), 99_00, Currency::Usd, "2024-01-10");

    let outcome =
        process_charge_for_auto_match(&source, &[near_miss], "tester").unwrap();
    assert_eq!(outcome.status, AutoMatchStatus::NoMatch);
    assert!(outcome.matched.is_none());
    assert!(outcome.reason.contains("best was charge"));
}

#[test]
fn auto_match_rejects_matched_and_empty_sources() {
    let source = matched_charge();
    let candidate = doc_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let err = process_charge_for_auto_match(&source, std::slice::from_ref(&candidate), "tester")
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyMatched(source.id()));

    // A charge with neither side cannot even be assembled.
    let empty = Charge::new("owner-1", Utc::now());
    let empty_id = empty.id;
    let err = ChargeWithData::assemble(
        empty,
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    )
    .unwrap_err();
    assert_eq!(err, EngineError::EmptyCharge(empty_id));
}

#[test]
fn matched_candidates_are_skipped_not_errors() {
    let source = tx_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let already_matched = matched_charge();

    let outcome =
        process_charge_for_auto_match(&source, &[already_matched], "tester").unwrap();
    assert_eq!(outcome.status, AutoMatchStatus::NoMatch);
    assert_eq!(outcome.reason, "no complementary candidates");
}

#[test]
fn merge_direction_keeps_the_matched_charge_in_either_order() {
    let matched = matched_charge();
    let unmatched = doc_charge(Some("B1"), 50_00, Currency::Ils, "2024-01-10");

    let (to_delete, to_keep) = determine_merge_direction(&matched, &unmatched);
    assert_eq!(to_delete.id(), unmatched.id());
    assert_eq!(to_keep.id(), matched.id());

    let (to_delete, to_keep) = determine_merge_direction(&unmatched, &matched);
    assert_eq!(to_delete.id(), unmatched.id());
    assert_eq!(to_keep.id(), matched.id());
}

#[test]
fn merge_direction_prefers_the_transaction_bearer_then_the_first_argument() {
    let with_tx = tx_charge(Some("B1"), 10_00, Currency::Ils, "2024-01-10");
    let with_doc = doc_charge(Some("B1"), 10_00, Currency::Ils, "2024-01-10");

    let (to_delete, to_keep) = determine_merge_direction(&with_doc, &with_tx);
    assert_eq!(to_delete.id(), with_doc.id());
    assert_eq!(to_keep.id(), with_tx.id());

    let doc_a = doc_charge(Some("B1"), 10_00, Currency::Ils, "2024-01-10");
    let doc_b = doc_charge(Some("B1"), 10_00, Currency::Ils, "2024-01-10");
    let (to_delete, to_keep) = determine_merge_direction(&doc_a, &doc_b);
    assert_eq!(to_delete.id(), doc_b.id());
    assert_eq!(to_keep.id(), doc_a.id());
}

#[test]
fn find_matches_ranks_descending_and_caps() {
    let source = tx_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let perfect = doc_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let wrong_amount = doc_charge(Some("B1"), 90_00, Currency::Usd, "2024-01-10");
    let unknown_business = doc_charge(None, 100_00, Currency::Usd, "2024-01-10");
    let pool = vec![wrong_amount, unknown_business, perfect.clone()];

    let ranked = find_matches(&source, &pool, "tester", &FindOptions::default()).unwrap();
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].candidate_charge_id, perfect.id());
    assert!(ranked[0].score >= ranked[1].score);
    assert!(ranked[1].score >= ranked[2].score);

    let capped = find_matches(
        &source,
        &pool,
        "tester",
        &FindOptions {
            date_window_months: None,
            max_matches: Some(1),
        },
    )
    .unwrap();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].candidate_charge_id, perfect.id());
}

#[test]
fn date_window_prunes_before_scoring() {
    let source = tx_charge(Some("B1"), 100_00, Currency::Usd, "2024-01-10");
    let far_away = doc_charge(Some("B1"), 100_00, Currency::Usd, "2024-07-10");

    let windowed = find_matches(
        &source,
        std::slice::from_ref(&far_away),
        "tester",
        &FindOptions {
            date_window_months: Some(2),
            max_matches: None,
        },
    )
    .unwrap();
    assert!(windowed.is_empty());

    // The auto-match path searches globally: no window, same pool.
    let global = find_matches(
        &source,
        std::slice::from_ref(&far_away),
        "tester",
        &FindOptions::default(),
    )
    .unwrap();
    assert_eq!(global.len(), 1);
}
