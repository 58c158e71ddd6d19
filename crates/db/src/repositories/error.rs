//! Error type shared by the ledger repositories.

use khata_core::ledger::LedgerError;
use khata_shared::AppError;
use sea_orm::{DbErr, SqlErr};

/// Error types for ledger and document operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain rule was violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Returns true if the underlying database error is a unique violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Database(err) if is_unique(err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Ledger(e) => e.into(),
            StoreError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Maps a unique violation on insert to `conflict`, passing other errors through.
pub(crate) fn on_unique_violation(
    err: DbErr,
    conflict: impl FnOnce() -> LedgerError,
) -> StoreError {
    if is_unique(&err) {
        StoreError::Ledger(conflict())
    } else {
        StoreError::Database(err)
    }
}

fn is_unique(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
