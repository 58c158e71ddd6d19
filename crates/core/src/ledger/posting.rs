//! Posting planning: which account a settlement hits and by how much.
//!
//! The database layer asks [`PostingService::resolve_target`] where a posting
//! goes, performs the atomic balance update, and reports back a
//! [`PostingOutcome`]. Nothing here touches storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{Direction, PaymentMode, TransactionType};
use crate::document::DocumentKind;

/// The document a ledger transaction was posted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Kind of the source document.
    pub kind: DocumentKind,
    /// Id of the source document.
    pub document_id: Uuid,
}

/// A request to move money on one account.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// Organization that owns the account.
    pub organization_id: Uuid,
    /// User performing the operation.
    pub user_id: Uuid,
    /// How the money moved.
    pub payment_mode: PaymentMode,
    /// Bank account chosen for non-cash modes.
    pub bank_account_id: Option<Uuid>,
    /// Positive amount.
    pub amount: Decimal,
    /// Business date of the transaction.
    pub transaction_date: NaiveDate,
    /// Stable, human-readable description.
    pub description: String,
    /// Ledger transaction type; fixes the direction.
    pub transaction_type: TransactionType,
    /// Document the posting belongs to.
    pub source: Option<SourceRef>,
}

impl PostingRequest {
    /// Direction of this posting on its target account.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.transaction_type.direction()
    }

    /// Signed delta applied to the target account.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed_amount(self.amount)
    }
}

/// Why a posting was intentionally not made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SkipReason {
    /// Nothing was settled.
    ZeroAmount,
    /// Non-cash mode without a bank account.
    NoBankAccountSelected,
    /// The chosen bank account does not exist in the organization.
    BankAccountNotFound {
        /// The id that was supplied.
        account_id: Uuid,
    },
}

/// Where a posting should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingTarget {
    /// The organization's cash account (created on first use).
    CashAccount,
    /// An explicitly chosen bank account, still to be looked up.
    BankAccount(Uuid),
    /// No posting.
    Skip(SkipReason),
}

/// A posting that was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedEntry {
    /// The ledger transaction written.
    pub transaction_id: Uuid,
    /// The account whose balance changed.
    pub account_id: Uuid,
    /// Type of the transaction.
    pub transaction_type: TransactionType,
    /// Positive amount recorded.
    pub amount: Decimal,
    /// Delta applied to the balance.
    pub signed_amount: Decimal,
    /// Balance after the delta.
    pub new_balance: Decimal,
}

/// Result of asking the ledger to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PostingOutcome {
    /// The balance changed and a transaction was recorded.
    Posted(PostedEntry),
    /// Nothing was written.
    Skipped {
        /// Why.
        reason: SkipReason,
    },
}

impl PostingOutcome {
    /// Builds a skipped outcome.
    #[must_use]
    pub const fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    /// Returns the posted entry, if any.
    #[must_use]
    pub const fn posted(&self) -> Option<&PostedEntry> {
        match self {
            Self::Posted(entry) => Some(entry),
            Self::Skipped { .. } => None,
        }
    }

    /// Returns true if nothing was written.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Stateless posting rules.
pub struct PostingService;

impl PostingService {
    /// Decides which account a posting targets.
    ///
    /// 1. A zero amount is skipped.
    /// 2. Cash (any casing) goes to the cash account.
    /// 3. Anything else needs an explicit bank account; without one the
    ///    posting is skipped and the document still succeeds.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeAmount` for a negative amount.
    pub fn resolve_target(request: &PostingRequest) -> Result<PostingTarget, LedgerError> {
        if request.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if request.amount.is_zero() {
            return Ok(PostingTarget::Skip(SkipReason::ZeroAmount));
        }
        if request.payment_mode.is_cash() {
            return Ok(PostingTarget::CashAccount);
        }
        Ok(request.bank_account_id.map_or(
            PostingTarget::Skip(SkipReason::NoBankAccountSelected),
            PostingTarget::BankAccount,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(mode: &str, bank: Option<Uuid>, amount: Decimal) -> PostingRequest {
        PostingRequest {
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            payment_mode: PaymentMode::parse(mode),
            bank_account_id: bank,
            amount,
            transaction_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            description: "Payment In: PIN-1".to_string(),
            transaction_type: TransactionType::PaymentIn,
            source: None,
        }
    }

    #[test]
    fn test_cash_goes_to_cash_account() {
        let target =
            PostingService::resolve_target(&request("CASH", Some(Uuid::new_v4()), dec!(500)));
        assert_eq!(target.unwrap(), PostingTarget::CashAccount);
    }

    #[test]
    fn test_bank_mode_uses_selected_account() {
        let bank = Uuid::new_v4();
        let target = PostingService::resolve_target(&request("UPI", Some(bank), dec!(500)));
        assert_eq!(target.unwrap(), PostingTarget::BankAccount(bank));
    }

    #[test]
    fn test_bank_mode_without_account_is_skipped() {
        let target = PostingService::resolve_target(&request("Cheque", None, dec!(500)));
        assert_eq!(
            target.unwrap(),
            PostingTarget::Skip(SkipReason::NoBankAccountSelected)
        );
    }

    #[test]
    fn test_zero_amount_is_skipped() {
        let target = PostingService::resolve_target(&request("Cash", None, Decimal::ZERO));
        assert_eq!(target.unwrap(), PostingTarget::Skip(SkipReason::ZeroAmount));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let result = PostingService::resolve_target(&request("Cash", None, dec!(-1)));
        assert!(matches!(result, Err(LedgerError::NegativeAmount)));
    }

    #[test]
    fn test_signed_amount_follows_type() {
        let mut req = request("Cash", None, dec!(200));
        assert_eq!(req.signed_amount(), dec!(200));
        req.transaction_type = TransactionType::PaymentOut;
        assert_eq!(req.signed_amount(), dec!(-200));
        assert_eq!(req.direction(), Direction::Decrease);
    }

    #[test]
    fn test_outcome_serialization() {
        let skipped = PostingOutcome::skipped(SkipReason::BankAccountNotFound {
            account_id: Uuid::nil(),
        });
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"]["code"], "bank_account_not_found");
        assert!(skipped.is_skipped());
        assert!(skipped.posted().is_none());
    }
}
