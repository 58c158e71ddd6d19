//! Reversal engine: undoes the posting recorded for a document.

use khata_core::ledger::{RecordedPosting, ReversalOutcome};
use sea_orm::ConnectionTrait;
use tracing::{debug, info};
use uuid::Uuid;

use super::account::AccountRepository;
use super::error::StoreError;
use super::ledger::LedgerRepository;

/// Best-effort reversal inside the caller's transaction.
pub struct ReversalEngine;

impl ReversalEngine {
    /// Restores the balance changed by the document's posting and deletes the row.
    ///
    /// The inverse delta is taken from the recorded row. A document with no
    /// posting yields [`ReversalOutcome::NothingToReverse`]; calling this twice
    /// never reverses twice because the first call deletes the row.
    ///
    /// # Errors
    ///
    /// Returns an error only on database failure.
    pub async fn reverse<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        document_id: Uuid,
    ) -> Result<ReversalOutcome, StoreError> {
        let Some(row) = LedgerRepository::find_by_source(conn, organization_id, document_id).await?
        else {
            debug!(
                organization_id = %organization_id,
                document_id = %document_id,
                "Nothing to reverse"
            );
            return Ok(ReversalOutcome::NothingToReverse);
        };

        let recorded = RecordedPosting {
            transaction_id: row.id,
            account_id: row.account_id,
            transaction_type: row.transaction_type.into(),
            amount: row.amount,
        };

        let new_balance = AccountRepository::apply_delta(
            conn,
            organization_id,
            recorded.account_id,
            recorded.inverse_delta(),
        )
        .await?;
        LedgerRepository::delete(conn, recorded.transaction_id).await?;

        info!(
            organization_id = %organization_id,
            document_id = %document_id,
            account_id = %recorded.account_id,
            transaction_id = %recorded.transaction_id,
            restored_delta = %recorded.inverse_delta(),
            new_balance = %new_balance,
            "Reversed"
        );

        Ok(ReversalOutcome::reversed(&recorded))
    }
}
