//! Reversal planning for postings tied to an edited or deleted document.
//!
//! A reversal is computed from the recorded transaction row, not from the
//! document's current fields, so it undoes exactly what was applied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::TransactionType;

/// A transaction as it was written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedPosting {
    /// The transaction row.
    pub transaction_id: Uuid,
    /// Account the delta was applied to.
    pub account_id: Uuid,
    /// Recorded type.
    pub transaction_type: TransactionType,
    /// Recorded positive amount.
    pub amount: Decimal,
}

impl RecordedPosting {
    /// The delta this row applied when it was posted.
    #[must_use]
    pub fn applied_delta(&self) -> Decimal {
        self.transaction_type.signed_amount(self.amount)
    }

    /// The delta that undoes it.
    #[must_use]
    pub fn inverse_delta(&self) -> Decimal {
        -self.applied_delta()
    }
}

/// What a reversal did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReversalOutcome {
    /// A prior posting was undone and its row deleted.
    Reversed {
        /// The deleted transaction.
        transaction_id: Uuid,
        /// The account that was restored.
        account_id: Uuid,
        /// Delta applied to restore the balance.
        restored_delta: Decimal,
    },
    /// No posting was linked to the document.
    NothingToReverse,
}

impl ReversalOutcome {
    /// Builds the outcome of undoing `recorded`.
    #[must_use]
    pub fn reversed(recorded: &RecordedPosting) -> Self {
        Self::Reversed {
            transaction_id: recorded.transaction_id,
            account_id: recorded.account_id,
            restored_delta: recorded.inverse_delta(),
        }
    }

    /// Returns true if a posting was undone.
    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        matches!(self, Self::Reversed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn recorded(transaction_type: TransactionType, amount: Decimal) -> RecordedPosting {
        RecordedPosting {
            transaction_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            transaction_type,
            amount,
        }
    }

    #[test]
    fn test_inverse_of_increase() {
        let posting = recorded(TransactionType::Add, dec!(500));
        assert_eq!(posting.applied_delta(), dec!(500));
        assert_eq!(posting.inverse_delta(), dec!(-500));
    }

    #[test]
    fn test_inverse_of_decrease() {
        let posting = recorded(TransactionType::PaymentOut, dec!(200));
        assert_eq!(posting.inverse_delta(), dec!(200));
    }

    #[test]
    fn test_credit_note_reversal_undoes_observed_increase() {
        let posting = recorded(TransactionType::CreditNote, dec!(75));
        assert_eq!(posting.applied_delta() + posting.inverse_delta(), Decimal::ZERO);
        assert_eq!(posting.inverse_delta(), dec!(-75));
    }

    #[test]
    fn test_reversed_outcome_carries_delta() {
        let posting = recorded(TransactionType::SalesReturn, dec!(40));
        let outcome = ReversalOutcome::reversed(&posting);
        assert!(outcome.is_reversed());
        assert_eq!(
            outcome,
            ReversalOutcome::Reversed {
                transaction_id: posting.transaction_id,
                account_id: posting.account_id,
                restored_delta: dec!(40),
            }
        );
        assert!(!ReversalOutcome::NothingToReverse.is_reversed());
    }
}
