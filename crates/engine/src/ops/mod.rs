//! Engine operations: everything that touches the database.
//!
//! Every public operation runs inside one database transaction ([`with_tx!`]):
//! commit on success, rollback (by drop) on error, connection returned on
//! every path. Batch operations open a nested transaction per charge, which
//! the driver maps to savepoints, so one failing charge never takes down its
//! siblings.

use sea_orm::DatabaseConnection;

use crate::{LockConfig, ResultEngine};

mod charges;
mod ledger;
mod matching;

pub use ledger::GenerateOptions;
pub use matching::AutoMatchReport;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    lock_config: LockConfig,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The injected historical-lock configuration.
    pub fn lock_config(&self) -> &LockConfig {
        &self.lock_config
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    lock_config: LockConfig,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Inject the process-wide lock configuration (admin context).
    pub fn lock_config(mut self, lock_config: LockConfig) -> EngineBuilder {
        self.lock_config = lock_config;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            lock_config: self.lock_config,
        })
    }
}
