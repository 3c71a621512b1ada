//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for the reconciliation engine:
//!
//! - `charges`: the aggregate grouping transactions and documents
//! - `bank_transactions`: bank-side movements per charge
//! - `documents`: accounting documents per charge
//! - `salary_records`: payroll sub-records
//! - `dividend_records`: dividend sub-records
//! - `business_trips`: trip sub-records
//! - `deposit_records`: bank-deposit sub-records
//! - `exchange_rates`: externally sourced rates into the local currency
//! - `ledger_entries`: the durable double-entry lines

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Charges {
    Table,
    Id,
    OwnerId,
    UserDescription,
    CreatedAt,
}

#[derive(Iden)]
enum BankTransactions {
    Table,
    Id,
    ChargeId,
    BusinessId,
    AmountMinor,
    Currency,
    ValueDate,
    EventDate,
    AccountId,
    AccountKind,
    IsConversion,
    IsFee,
}

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    ChargeId,
    BusinessId,
    AmountMinor,
    Currency,
    Date,
    VatMinor,
    Kind,
    Serial,
}

#[derive(Iden)]
enum SalaryRecords {
    Table,
    Id,
    ChargeId,
    EmployeeId,
    Month,
    GrossMinor,
    NetMinor,
    IncomeTaxMinor,
    PensionMinor,
}

#[derive(Iden)]
enum DividendRecords {
    Table,
    Id,
    ChargeId,
    ShareholderId,
    AmountMinor,
    WithholdingMinor,
}

#[derive(Iden)]
enum BusinessTrips {
    Table,
    Id,
    ChargeId,
    EmployeeId,
    Destination,
    StartDate,
    EndDate,
    AllowanceMinor,
}

#[derive(Iden)]
enum DepositRecords {
    Table,
    Id,
    ChargeId,
    DepositAccountId,
    IsWithdrawal,
}

#[derive(Iden)]
enum ExchangeRates {
    Table,
    Currency,
    RateDate,
    RateToLocal,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    ChargeId,
    OwnerId,
    Currency,
    CreditEntity1,
    CreditEntity2,
    DebitEntity1,
    DebitEntity2,
    CreditLocalMinor1,
    CreditLocalMinor2,
    DebitLocalMinor1,
    DebitLocalMinor2,
    CreditForeignMinor1,
    CreditForeignMinor2,
    DebitForeignMinor1,
    DebitForeignMinor2,
    InvoiceDate,
    ValueDate,
    Description,
    Reference,
    CurrencyRate,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Charges
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Charges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Charges::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Charges::OwnerId).string().not_null())
                    .col(ColumnDef::new(Charges::UserDescription).string())
                    .col(
                        ColumnDef::new(Charges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-charges-owner_id")
                    .table(Charges::Table)
                    .col(Charges::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Bank transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankTransactions::ChargeId).string().not_null())
                    .col(ColumnDef::new(BankTransactions::BusinessId).string())
                    .col(
                        ColumnDef::new(BankTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::Currency)
                            .string()
                            .not_null()
                            .default("ILS"),
                    )
                    .col(ColumnDef::new(BankTransactions::ValueDate).date().not_null())
                    .col(ColumnDef::new(BankTransactions::EventDate).date().not_null())
                    .col(ColumnDef::new(BankTransactions::AccountId).string().not_null())
                    .col(
                        ColumnDef::new(BankTransactions::AccountKind)
                            .string()
                            .not_null()
                            .default("checking"),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::IsConversion)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankTransactions::IsFee).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_transactions-charge_id")
                            .from(BankTransactions::Table, BankTransactions::ChargeId)
                            .to(Charges::Table, Charges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_transactions-charge_id")
                    .table(BankTransactions::Table)
                    .col(BankTransactions::ChargeId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Documents
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::ChargeId).string().not_null())
                    .col(ColumnDef::new(Documents::BusinessId).string())
                    .col(ColumnDef::new(Documents::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Documents::Currency)
                            .string()
                            .not_null()
                            .default("ILS"),
                    )
                    .col(ColumnDef::new(Documents::Date).date().not_null())
                    .col(ColumnDef::new(Documents::VatMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Documents::Kind)
                            .string()
                            .not_null()
                            .default("invoice"),
                    )
                    .col(ColumnDef::new(Documents::Serial).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-documents-charge_id")
                            .from(Documents::Table, Documents::ChargeId)
                            .to(Charges::Table, Charges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-documents-charge_id")
                    .table(Documents::Table)
                    .col(Documents::ChargeId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Salary records
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SalaryRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalaryRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SalaryRecords::ChargeId).string().not_null())
                    .col(ColumnDef::new(SalaryRecords::EmployeeId).string().not_null())
                    .col(ColumnDef::new(SalaryRecords::Month).string().not_null())
                    .col(
                        ColumnDef::new(SalaryRecords::GrossMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SalaryRecords::NetMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(SalaryRecords::IncomeTaxMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::PensionMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-salary_records-charge_id")
                            .from(SalaryRecords::Table, SalaryRecords::ChargeId)
                            .to(Charges::Table, Charges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Dividend records
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DividendRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DividendRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DividendRecords::ChargeId).string().not_null())
                    .col(
                        ColumnDef::new(DividendRecords::ShareholderId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DividendRecords::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DividendRecords::WithholdingMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-dividend_records-charge_id")
                            .from(DividendRecords::Table, DividendRecords::ChargeId)
                            .to(Charges::Table, Charges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Business trips
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BusinessTrips::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BusinessTrips::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BusinessTrips::ChargeId).string().not_null())
                    .col(ColumnDef::new(BusinessTrips::EmployeeId).string().not_null())
                    .col(ColumnDef::new(BusinessTrips::Destination).string().not_null())
                    .col(ColumnDef::new(BusinessTrips::StartDate).date().not_null())
                    .col(ColumnDef::new(BusinessTrips::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(BusinessTrips::AllowanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-business_trips-charge_id")
                            .from(BusinessTrips::Table, BusinessTrips::ChargeId)
                            .to(Charges::Table, Charges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Deposit records
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DepositRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DepositRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DepositRecords::ChargeId).string().not_null())
                    .col(
                        ColumnDef::new(DepositRecords::DepositAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepositRecords::IsWithdrawal)
                            .boolean()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-deposit_records-charge_id")
                            .from(DepositRecords::Table, DepositRecords::ChargeId)
                            .to(Charges::Table, Charges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Exchange rates
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExchangeRates::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ExchangeRates::Currency).string().not_null())
                    .col(ColumnDef::new(ExchangeRates::RateDate).date().not_null())
                    .col(
                        ColumnDef::new(ExchangeRates::RateToLocal)
                            .double()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExchangeRates::Currency)
                            .col(ExchangeRates::RateDate),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::ChargeId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::Currency)
                            .string()
                            .not_null()
                            .default("ILS"),
                    )
                    .col(ColumnDef::new(LedgerEntries::CreditEntity1).string())
                    .col(ColumnDef::new(LedgerEntries::CreditEntity2).string())
                    .col(ColumnDef::new(LedgerEntries::DebitEntity1).string())
                    .col(ColumnDef::new(LedgerEntries::DebitEntity2).string())
                    .col(
                        ColumnDef::new(LedgerEntries::CreditLocalMinor1)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::CreditLocalMinor2)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::DebitLocalMinor1)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::DebitLocalMinor2)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::CreditForeignMinor1).big_integer())
                    .col(ColumnDef::new(LedgerEntries::CreditForeignMinor2).big_integer())
                    .col(ColumnDef::new(LedgerEntries::DebitForeignMinor1).big_integer())
                    .col(ColumnDef::new(LedgerEntries::DebitForeignMinor2).big_integer())
                    .col(ColumnDef::new(LedgerEntries::InvoiceDate).date().not_null())
                    .col(ColumnDef::new(LedgerEntries::ValueDate).date().not_null())
                    .col(ColumnDef::new(LedgerEntries::Description).string())
                    .col(ColumnDef::new(LedgerEntries::Reference).string())
                    .col(ColumnDef::new(LedgerEntries::CurrencyRate).double())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-charge_id")
                            .from(LedgerEntries::Table, LedgerEntries::ChargeId)
                            .to(Charges::Table, Charges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-charge_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::ChargeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-owner_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExchangeRates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DepositRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessTrips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DividendRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalaryRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Charges::Table).to_owned())
            .await?;
        Ok(())
    }
}
