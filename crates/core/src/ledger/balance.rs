//! Account balance reconciliation.
//!
//! An account's `current_balance` must always equal its opening balance plus
//! the signed amounts of every transaction recorded against it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use super::types::TransactionType;

/// Result of replaying an account's transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// The account checked.
    pub account_id: Uuid,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Stored running balance.
    pub current_balance: Decimal,
    /// Opening balance plus every signed transaction.
    pub expected_balance: Decimal,
    /// `current_balance - expected_balance`; zero when consistent.
    pub drift: Decimal,
    /// Number of transactions replayed.
    pub transaction_count: u64,
}

impl Reconciliation {
    /// Replays `entries` (type, amount) on top of `opening_balance`.
    #[must_use]
    pub fn replay<I>(
        account_id: Uuid,
        opening_balance: Decimal,
        current_balance: Decimal,
        entries: I,
    ) -> Self
    where
        I: IntoIterator<Item = (TransactionType, Decimal)>,
    {
        let mut expected_balance = opening_balance;
        let mut transaction_count = 0u64;
        for (transaction_type, amount) in entries {
            expected_balance += transaction_type.signed_amount(amount);
            transaction_count += 1;
        }

        Self {
            account_id,
            opening_balance,
            current_balance,
            expected_balance,
            drift: current_balance - expected_balance,
            transaction_count,
        }
    }

    /// Returns true if the stored balance matches the log.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.drift.is_zero()
    }
}

/// Checks that `available` covers a withdrawal of `requested`.
///
/// # Errors
///
/// Returns `LedgerError::InsufficientBalance` when it does not.
pub fn ensure_sufficient_balance(
    account_id: Uuid,
    available: Decimal,
    requested: Decimal,
) -> Result<(), LedgerError> {
    if available < requested {
        return Err(LedgerError::InsufficientBalance {
            account_id,
            available,
            requested,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_replay_consistent_account() {
        let entries = [
            (TransactionType::Add, dec!(500)),
            (TransactionType::PaymentOut, dec!(200)),
            (TransactionType::TransferIn, dec!(50)),
        ];
        let rec = Reconciliation::replay(Uuid::nil(), dec!(1000), dec!(1350), entries);

        assert_eq!(rec.expected_balance, dec!(1350));
        assert_eq!(rec.transaction_count, 3);
        assert!(rec.is_consistent());
    }

    #[test]
    fn test_replay_detects_drift() {
        let entries = [(TransactionType::Expense, dec!(100))];
        let rec = Reconciliation::replay(Uuid::nil(), dec!(0), dec!(-80), entries);

        assert_eq!(rec.expected_balance, dec!(-100));
        assert_eq!(rec.drift, dec!(20));
        assert!(!rec.is_consistent());
    }

    #[test]
    fn test_empty_log_equals_opening() {
        let rec = Reconciliation::replay(Uuid::nil(), dec!(250), dec!(250), []);
        assert!(rec.is_consistent());
        assert_eq!(rec.transaction_count, 0);
    }

    #[test]
    fn test_ensure_sufficient_balance() {
        assert!(ensure_sufficient_balance(Uuid::nil(), dec!(300), dec!(300)).is_ok());
        assert!(matches!(
            ensure_sufficient_balance(Uuid::nil(), dec!(299.99), dec!(300)),
            Err(LedgerError::InsufficientBalance { .. })
        ));
    }
}
