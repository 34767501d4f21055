//! Unit-of-work transaction boundary.
//!
//! One unit of work wraps all writes of a single business operation so
//! they commit or roll back together. Instances are per-operation values
//! owned by the orchestrator; they are never shared across operations.

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, TransactionTrait};
use thiserror::Error;

use stanza_shared::AppError;

/// Errors raised by the unit of work.
///
/// The state errors (`AlreadyOpen`, `NotOpen`, `RollbackFailed`) indicate a
/// programming error in the orchestration and are surfaced as fatal, never
/// recovered locally.
#[derive(Debug, Error)]
pub enum UowError {
    /// `begin` was called while a transaction is already in progress.
    #[error("A transaction is already in progress")]
    AlreadyOpen,

    /// `commit`, `rollback`, or a write was requested with no open
    /// transaction.
    #[error("No transaction in progress")]
    NotOpen,

    /// The rollback itself failed; distinct from whatever caused it.
    #[error("Rollback failed: {0}")]
    RollbackFailed(#[source] DbErr),

    /// Underlying database error while beginning or committing.
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl From<UowError> for AppError {
    fn from(err: UowError) -> Self {
        match err {
            UowError::AlreadyOpen | UowError::NotOpen | UowError::RollbackFailed(_) => {
                Self::FatalTransaction(err.to_string())
            }
            UowError::Db(inner) => {
                tracing::error!(error = %inner, "unit of work database failure");
                Self::Persistence("Transaction could not be completed".to_string())
            }
        }
    }
}

/// Transaction boundary for one business operation.
///
/// At most one transaction may be open at a time. The conflict-check +
/// insert window runs at SERIALIZABLE isolation so concurrent attempts on
/// the same room cannot both pass the check; the store-level exclusion
/// constraint backstops it. Dropping an open unit of work rolls the
/// transaction back, so a cancelled operation can never publish a partial
/// commit.
#[derive(Debug)]
pub struct UnitOfWork {
    db: DatabaseConnection,
    txn: Option<DatabaseTransaction>,
}

impl UnitOfWork {
    /// Creates a unit of work over the given connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, txn: None }
    }

    /// Returns true while a transaction is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.txn.is_some()
    }

    /// Opens the transaction at SERIALIZABLE isolation.
    ///
    /// # Errors
    ///
    /// `AlreadyOpen` if a transaction is already in progress.
    pub async fn begin(&mut self) -> Result<(), UowError> {
        if self.txn.is_some() {
            return Err(UowError::AlreadyOpen);
        }
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;
        self.txn = Some(txn);
        Ok(())
    }

    /// Returns the open transaction for issuing reads and writes.
    ///
    /// # Errors
    ///
    /// `NotOpen` if no transaction is in progress.
    pub fn txn(&self) -> Result<&DatabaseTransaction, UowError> {
        self.txn.as_ref().ok_or(UowError::NotOpen)
    }

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// `NotOpen` if no transaction is in progress.
    pub async fn commit(&mut self) -> Result<(), UowError> {
        let txn = self.txn.take().ok_or(UowError::NotOpen)?;
        txn.commit().await?;
        Ok(())
    }

    /// Rolls the open transaction back.
    ///
    /// # Errors
    ///
    /// `NotOpen` if no transaction is in progress; `RollbackFailed` if the
    /// rollback itself cannot be executed.
    pub async fn rollback(&mut self) -> Result<(), UowError> {
        let txn = self.txn.take().ok_or(UowError::NotOpen)?;
        txn.rollback().await.map_err(UowError::RollbackFailed)?;
        Ok(())
    }
}
