//! Posting engine: applies one settlement to one account.

use khata_core::ledger::{
    PostedEntry, PostingOutcome, PostingRequest, PostingService, PostingTarget, SkipReason,
};
use sea_orm::ConnectionTrait;
use tracing::{info, warn};

use super::account::AccountRepository;
use super::error::StoreError;
use super::ledger::{LedgerRepository, NewLedgerTransaction};

/// Writes postings inside the caller's transaction.
///
/// The balance update and the log append happen on the same connection, so
/// they commit or roll back with the document that caused them.
pub struct PostingEngine;

impl PostingEngine {
    /// Resolves the target account, applies the signed amount and records it.
    ///
    /// A non-cash posting without a usable bank account is not an error: the
    /// outcome is [`PostingOutcome::Skipped`] and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative amount or a database failure.
    pub async fn post<C: ConnectionTrait>(
        conn: &C,
        request: &PostingRequest,
    ) -> Result<PostingOutcome, StoreError> {
        let account = match PostingService::resolve_target(request)? {
            PostingTarget::Skip(reason) => return Ok(Self::skip(request, reason)),
            PostingTarget::CashAccount => {
                AccountRepository::get_or_create_cash_account(
                    conn,
                    request.organization_id,
                    request.user_id,
                )
                .await?
            }
            PostingTarget::BankAccount(account_id) => {
                match AccountRepository::find(conn, request.organization_id, account_id).await? {
                    Some(account) => account,
                    None => {
                        return Ok(Self::skip(
                            request,
                            SkipReason::BankAccountNotFound { account_id },
                        ));
                    }
                }
            }
        };

        let signed_amount = request.signed_amount();
        let new_balance = AccountRepository::apply_delta(
            conn,
            request.organization_id,
            account.id,
            signed_amount,
        )
        .await?;
        let row =
            LedgerRepository::append(conn, NewLedgerTransaction::for_posting(request, account.id))
                .await?;

        info!(
            organization_id = %request.organization_id,
            account_id = %account.id,
            transaction_id = %row.id,
            transaction_type = %request.transaction_type,
            amount = %request.amount,
            new_balance = %new_balance,
            "Posted"
        );

        Ok(PostingOutcome::Posted(PostedEntry {
            transaction_id: row.id,
            account_id: account.id,
            transaction_type: request.transaction_type,
            amount: request.amount,
            signed_amount,
            new_balance,
        }))
    }

    fn skip(request: &PostingRequest, reason: SkipReason) -> PostingOutcome {
        warn!(
            organization_id = %request.organization_id,
            payment_mode = %request.payment_mode,
            amount = %request.amount,
            reason = ?reason,
            description = %request.description,
            "Posting skipped"
        );
        PostingOutcome::skipped(reason)
    }
}
