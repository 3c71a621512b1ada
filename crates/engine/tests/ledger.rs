use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection};

use engine::{
    AutoMatchStatus, BankTransaction, Charge, Currency, Document, Engine, EngineError,
    GenerateOptions, LockConfig, Money, SalaryRecord, accounts, ledger::LedgerEntryDraft,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn insert_charge(db: &DatabaseConnection, description: Option<&str>) -> Charge {
    let mut charge = Charge::new("owner-1", Utc::now());
    charge.user_description = description.map(String::from);
    engine::charges::ActiveModel::from(&charge)
        .insert(db)
        .await
        .unwrap();
    charge
}

async fn insert_tx(db: &DatabaseConnection, tx: &BankTransaction) {
    engine::bank_transactions::ActiveModel::from(tx)
        .insert(db)
        .await
        .unwrap();
}

async fn insert_doc(db: &DatabaseConnection, doc: &Document) {
    engine::documents::ActiveModel::from(doc)
        .insert(db)
        .await
        .unwrap();
}

async fn insert_rate(db: &DatabaseConnection, currency: Currency, rate_date: &str, rate: f64) {
    engine::rates::ActiveModel {
        currency: ActiveValue::Set(currency.code().to_string()),
        rate_date: ActiveValue::Set(date(rate_date)),
        rate_to_local: ActiveValue::Set(rate),
    }
    .insert(db)
    .await
    .unwrap();
}

#[tokio::test]
async fn common_charge_generates_balanced_entries() {
    let (engine, db) = engine_with_db().await;
    let charge = insert_charge(&db, None).await;

    let mut tx = BankTransaction::new(
        charge.id,
        Money::new(-117_00),
        Currency::Ils,
        date("2024-01-10"),
        "acc-1",
    );
    tx.business_id = Some("supplier-1".to_string());
    insert_tx(&db, &tx).await;

    let mut doc = Document::new(charge.id, Money::new(-117_00), Currency::Ils, date("2024-01-10"));
    doc.business_id = Some("supplier-1".to_string());
    doc.vat = Money::new(-17_00);
    insert_doc(&db, &doc).await;

    let generated = engine
        .generate_ledger(charge.id, GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(generated.entries.len(), 2);
    assert!(generated.errors.is_empty());
    assert!(!generated.from_store);
    assert!(generated.balance.is_balanced);
    assert_eq!(generated.balance.balance_sum, Money::ZERO);
    // The supplier is credited by the document and debited by the payment.
    assert!(generated.balance.unbalanced_entities.is_empty());

    let vat_leg = generated
        .entries
        .iter()
        .find(|e| e.debit_entity2.as_deref() == Some(accounts::VAT_INPUTS))
        .unwrap();
    assert_eq!(vat_leg.debit_local2, Money::new(17_00));
}

#[tokio::test]
async fn generation_is_idempotent_per_charge() {
    let (engine, db) = engine_with_db().await;
    let charge = insert_charge(&db, None).await;
    let mut tx = BankTransaction::new(
        charge.id,
        Money::new(-50_00),
        Currency::Ils,
        date("2024-02-01"),
        "acc-1",
    );
    tx.business_id = Some("supplier-1".to_string());
    insert_tx(&db, &tx).await;

    let opts = GenerateOptions {
        insert_if_not_exists: true,
    };
    let first = engine.generate_ledger(charge.id, opts).await.unwrap();
    let second = engine.generate_ledger(charge.id, opts).await.unwrap();
    assert_eq!(first.entries, second.entries);

    let stored = engine.ledger_entries(charge.id).await.unwrap();
    assert_eq!(stored.len(), first.entries.len());
}

#[tokio::test]
async fn locked_charge_returns_stored_entries_verbatim() {
    let (engine, db) = engine_with_db().await;
    let charge = insert_charge(&db, None).await;
    let mut tx = BankTransaction::new(
        charge.id,
        Money::new(-80_00),
        Currency::Ils,
        date("2023-06-15"),
        "acc-1",
    );
    tx.business_id = Some("supplier-1".to_string());
    insert_tx(&db, &tx).await;

    engine
        .generate_ledger(
            charge.id,
            GenerateOptions {
                insert_if_not_exists: true,
            },
        )
        .await
        .unwrap();
    let stored = engine.ledger_entries(charge.id).await.unwrap();

    // The charge's data changes, but its period is now frozen.
    let mut extra = BankTransaction::new(
        charge.id,
        Money::new(-999_00),
        Currency::Ils,
        date("2023-06-16"),
        "acc-1",
    );
    extra.business_id = Some("supplier-2".to_string());
    insert_tx(&db, &extra).await;

    let locked_engine = Engine::builder()
        .database(db.clone())
        .lock_config(LockConfig::new().lock_before(date("2024-01-01")))
        .build()
        .await
        .unwrap();
    let generated = locked_engine
        .generate_ledger(
            charge.id,
            GenerateOptions {
                insert_if_not_exists: true,
            },
        )
        .await
        .unwrap();
    assert!(generated.from_store);
    assert_eq!(generated.entries, stored);

    // Nothing new was written either.
    let after = locked_engine.ledger_entries(charge.id).await.unwrap();
    assert_eq!(after.len(), stored.len());
}

#[tokio::test]
async fn revaluation_books_the_residual_difference() {
    let (engine, db) = engine_with_db().await;

    // History: one USD entry leaving the account at a booked local value of
    // 350.00 against 100.00 foreign, dated before the designated date.
    let history = insert_charge(&db, None).await;
    let mut history_tx = BankTransaction::new(
        history.id,
        Money::new(100_00),
        Currency::Usd,
        date("2024-03-30"),
        "acc-1",
    );
    history_tx.business_id = Some("client-1".to_string());
    insert_tx(&db, &history_tx).await;
    let prior = LedgerEntryDraft::new(
        history.id,
        "owner-1",
        Currency::Usd,
        date("2024-03-30"),
        date("2024-03-30"),
    )
    .debit(accounts::bank("acc-1"), Money::new(350_00), Some(Money::new(100_00)))
    .unwrap()
    .credit("client-1", Money::new(350_00), None)
    .unwrap();
    engine::ledger::ActiveModel::from(&prior)
        .insert(&db)
        .await
        .unwrap();

    insert_rate(&db, Currency::Usd, "2024-03-31", 3.6).await;
    let reval = insert_charge(&db, Some("Revaluation 2024-03-31")).await;

    let generated = engine
        .generate_ledger(reval.id, GenerateOptions::default())
        .await
        .unwrap();
    assert!(generated.errors.is_empty());
    assert_eq!(generated.entries.len(), 1);

    // Booked 350.00 vs 100.00 * 3.6 = 360.00: the account is credited 10.00
    // against the revaluation category, both legs equal.
    let entry = &generated.entries[0];
    assert_eq!(entry.credit_entity1.as_deref(), Some("bank:acc-1"));
    assert_eq!(entry.credit_local1, Money::new(10_00));
    assert_eq!(entry.debit_entity1.as_deref(), Some(accounts::REVALUATION));
    assert_eq!(entry.debit_local1, Money::new(10_00));
    assert_eq!(entry.value_date, date("2024-03-31"));
    assert_eq!(entry.currency_rate, Some(3.6));
}

#[tokio::test]
async fn revaluation_skips_accounts_already_at_market_value() {
    let (engine, db) = engine_with_db().await;
    let history = insert_charge(&db, None).await;
    let mut history_tx = BankTransaction::new(
        history.id,
        Money::new(100_00),
        Currency::Usd,
        date("2024-03-30"),
        "acc-1",
    );
    history_tx.business_id = Some("client-1".to_string());
    insert_tx(&db, &history_tx).await;
    let prior = LedgerEntryDraft::new(
        history.id,
        "owner-1",
        Currency::Usd,
        date("2024-03-30"),
        date("2024-03-30"),
    )
    .debit(accounts::bank("acc-1"), Money::new(360_00), Some(Money::new(100_00)))
    .unwrap()
    .credit("client-1", Money::new(360_00), None)
    .unwrap();
    engine::ledger::ActiveModel::from(&prior)
        .insert(&db)
        .await
        .unwrap();

    insert_rate(&db, Currency::Usd, "2024-03-31", 3.6).await;
    let reval = insert_charge(&db, Some("Revaluation 2024-03-31")).await;

    let generated = engine
        .generate_ledger(reval.id, GenerateOptions::default())
        .await
        .unwrap();
    // Zero difference emits no entry, not a zero-amount entry.
    assert!(generated.entries.is_empty());
}

#[tokio::test]
async fn missing_revaluation_date_is_fatal_for_the_charge() {
    let (engine, db) = engine_with_db().await;
    let reval = insert_charge(&db, Some("Revaluation soon")).await;

    let err = engine
        .generate_ledger(reval.id, GenerateOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingRevaluationDate(reval.id));
}

#[tokio::test]
async fn missing_exchange_rate_is_a_nonfatal_issue() {
    let (engine, db) = engine_with_db().await;
    let charge = insert_charge(&db, None).await;
    let mut usd_tx = BankTransaction::new(
        charge.id,
        Money::new(-40_00),
        Currency::Usd,
        date("2024-04-02"),
        "acc-1",
    );
    usd_tx.business_id = Some("supplier-1".to_string());
    insert_tx(&db, &usd_tx).await;
    let mut ils_tx = BankTransaction::new(
        charge.id,
        Money::new(-30_00),
        Currency::Ils,
        date("2024-04-02"),
        "acc-1",
    );
    ils_tx.business_id = Some("supplier-1".to_string());
    insert_tx(&db, &ils_tx).await;

    let generated = engine
        .generate_ledger(charge.id, GenerateOptions::default())
        .await
        .unwrap();
    // The ILS movement still ledgers; the USD one is reported, not fatal.
    assert_eq!(generated.entries.len(), 1);
    assert_eq!(generated.errors.len(), 1);
    assert!(generated.errors[0].message.contains("missing USD rate"));
}

#[tokio::test]
async fn empty_charge_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let charge = insert_charge(&db, None).await;

    let err = engine
        .generate_ledger(charge.id, GenerateOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::EmptyCharge(charge.id));
}

#[tokio::test]
async fn conversion_books_the_exchange_difference() {
    let (engine, db) = engine_with_db().await;
    let charge = insert_charge(&db, None).await;

    let mut out = BankTransaction::new(
        charge.id,
        Money::new(-100_00),
        Currency::Usd,
        date("2024-05-07"),
        "acc-usd",
    );
    out.is_conversion = true;
    insert_tx(&db, &out).await;
    let mut incoming = BankTransaction::new(
        charge.id,
        Money::new(340_00),
        Currency::Ils,
        date("2024-05-07"),
        "acc-ils",
    );
    incoming.is_conversion = true;
    insert_tx(&db, &incoming).await;
    insert_rate(&db, Currency::Usd, "2024-05-07", 3.5).await;

    let generated = engine
        .generate_ledger(charge.id, GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(generated.entries.len(), 3);
    assert!(generated.balance.is_balanced);

    // Sold 100.00 USD booked at 350.00, received 340.00: a 10.00 loss.
    let diff = generated
        .entries
        .iter()
        .find(|e| e.debit_entity1.as_deref() == Some(accounts::EXCHANGE_DIFF))
        .unwrap();
    assert_eq!(diff.debit_local1, Money::new(10_00));
}

#[tokio::test]
async fn salary_charge_splits_gross_across_recipients() {
    let (engine, db) = engine_with_db().await;
    let charge = insert_charge(&db, None).await;

    let record = SalaryRecord {
        charge_id: charge.id,
        employee_id: "employee-1".to_string(),
        month: "2024-03".to_string(),
        gross: Money::new(10_000_00),
        net: Money::new(7_000_00),
        income_tax: Money::new(2_000_00),
        pension: Money::new(1_000_00),
    };
    engine::salary_records::ActiveModel::from(&record)
        .insert(&db)
        .await
        .unwrap();
    let pay = BankTransaction::new(
        charge.id,
        Money::new(-7_000_00),
        Currency::Ils,
        date("2024-04-01"),
        "acc-1",
    );
    insert_tx(&db, &pay).await;

    let generated = engine
        .generate_ledger(charge.id, GenerateOptions::default())
        .await
        .unwrap();
    assert!(generated.balance.is_balanced);
    assert!(generated.errors.is_empty());
    // Net+tax entry, pension entry, bank payment entry.
    assert_eq!(generated.entries.len(), 3);
    // The employee is credited net and debited by the payment.
    assert!(generated.balance.unbalanced_entities.is_empty());

    let payroll = generated
        .entries
        .iter()
        .find(|e| e.credit_entity1.as_deref() == Some("employee-1"))
        .unwrap();
    assert_eq!(payroll.credit_local1, Money::new(7_000_00));
    assert_eq!(payroll.credit_entity2.as_deref(), Some(accounts::TAX_AUTHORITY));
    assert_eq!(payroll.credit_local2, Money::new(2_000_00));
    assert_eq!(payroll.debit_local1, Money::new(9_000_00));
}

#[tokio::test]
async fn auto_match_pass_merges_the_exact_pair() {
    let (engine, db) = engine_with_db().await;

    let tx_charge = insert_charge(&db, None).await;
    let mut tx = BankTransaction::new(
        tx_charge.id,
        Money::new(100_00),
        Currency::Usd,
        date("2024-01-10"),
        "acc-1",
    );
    tx.business_id = Some("B1".to_string());
    insert_tx(&db, &tx).await;

    let doc_charge = insert_charge(&db, None).await;
    let mut doc = Document::new(
        doc_charge.id,
        Money::new(100_00),
        Currency::Usd,
        date("2024-01-10"),
    );
    doc.business_id = Some("B1".to_string());
    insert_doc(&db, &doc).await;

    let reports = engine.auto_match_pass("owner-1", "tester").await.unwrap();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.charge_id, tx_charge.id);
    assert_eq!(
        report.outcome.as_ref().unwrap().status,
        AutoMatchStatus::Matched
    );
    // The transaction-bearing charge survives; the document moved onto it.
    assert_eq!(report.merged_into, Some(tx_charge.id));

    let kept = engine.load_charge(tx_charge.id).await.unwrap();
    assert!(kept.is_matched());
    let err = engine.load_charge(doc_charge.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("charge not exists".to_string()));
}

#[tokio::test]
async fn auto_match_pass_leaves_ambiguous_charges_alone() {
    let (engine, db) = engine_with_db().await;

    let tx_charge = insert_charge(&db, None).await;
    let mut tx = BankTransaction::new(
        tx_charge.id,
        Money::new(100_00),
        Currency::Usd,
        date("2024-01-10"),
        "acc-1",
    );
    tx.business_id = Some("B1".to_string());
    insert_tx(&db, &tx).await;

    for _ in 0..2 {
        let doc_charge = insert_charge(&db, None).await;
        let mut doc = Document::new(
            doc_charge.id,
            Money::new(100_00),
            Currency::Usd,
            date("2024-01-10"),
        );
        doc.business_id = Some("B1".to_string());
        insert_doc(&db, &doc).await;
    }

    let reports = engine.auto_match_pass("owner-1", "tester").await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].outcome.as_ref().unwrap().status,
        AutoMatchStatus::Skipped
    );
    assert!(reports[0].merged_into.is_none());

    // All three charges still exist, unmatched, for manual review.
    let pool = engine.load_unmatched("owner-1").await.unwrap();
    assert_eq!(pool.len(), 3);
}

#[tokio::test]
async fn merge_charges_repoints_every_row() {
    let (engine, db) = engine_with_db().await;

    let keep = insert_charge(&db, None).await;
    let mut tx = BankTransaction::new(
        keep.id,
        Money::new(100_00),
        Currency::Ils,
        date("2024-01-10"),
        "acc-1",
    );
    tx.business_id = Some("B1".to_string());
    insert_tx(&db, &tx).await;

    let delete = insert_charge(&db, None).await;
    let mut doc = Document::new(delete.id, Money::new(100_00), Currency::Ils, date("2024-01-10"));
    doc.business_id = Some("B1".to_string());
    insert_doc(&db, &doc).await;

    engine.merge_charges(delete.id, keep.id).await.unwrap();

    let merged = engine.load_charge(keep.id).await.unwrap();
    assert!(merged.is_matched());
    assert_eq!(merged.documents.len(), 1);
    assert!(engine.load_charge(delete.id).await.is_err());
}
