//! Ledger domain types: account kinds, transaction types and posting direction.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Canonical name of the per-organization cash account.
pub const CASH_ACCOUNT_NAME: &str = "Cash in Hand";

/// Kind of money-holding account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// A bank account.
    Bank,
    /// A cash drawer.
    Cash,
}

impl AccountKind {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Cash => "cash",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bank" => Ok(Self::Bank),
            "cash" => Ok(Self::Cash),
            other => Err(LedgerError::InvalidAccountKind(other.to_string())),
        }
    }
}

/// Whether a posting raises or lowers the target account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Balance goes up.
    Increase,
    /// Balance goes down.
    Decrease,
}

impl Direction {
    /// Applies this direction to a positive amount.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Increase => amount,
            Self::Decrease => -amount,
        }
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Increase => Self::Decrease,
            Self::Decrease => Self::Increase,
        }
    }
}

/// Type of a ledger transaction.
///
/// The amount stored on a transaction is always positive; its effect on the
/// account balance is implied by the type (see [`TransactionType::direction`]).
/// The snake_case names are persisted and read by reporting, so they must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money added (manual deposit, sales invoice or POS receipt).
    Add,
    /// Money removed (manual withdrawal, purchase invoice payment).
    Reduce,
    /// Outgoing leg of a transfer.
    TransferOut,
    /// Incoming leg of an internal transfer.
    TransferIn,
    /// Expense paid.
    Expense,
    /// Payment received from a party.
    PaymentIn,
    /// Payment made to a party.
    PaymentOut,
    /// Refund paid to a customer for returned goods.
    SalesReturn,
    /// Refund received from a supplier for returned goods.
    PurchaseReturn,
    /// Credit note settlement.
    CreditNote,
    /// Debit note settlement.
    DebitNote,
}

impl TransactionType {
    /// Every transaction type, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Add,
        Self::Reduce,
        Self::TransferOut,
        Self::TransferIn,
        Self::Expense,
        Self::PaymentIn,
        Self::PaymentOut,
        Self::SalesReturn,
        Self::PurchaseReturn,
        Self::CreditNote,
        Self::DebitNote,
    ];

    /// Returns the effect of this transaction type on its account.
    ///
    /// `CreditNote` increases the balance even though a credit note refund is
    /// money leaving the business. Sales return refunds decrease it. Existing
    /// ledgers and reports were built with this sign, so it is kept as is.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Add
            | Self::TransferIn
            | Self::PaymentIn
            | Self::PurchaseReturn
            | Self::CreditNote => Direction::Increase,
            Self::Reduce
            | Self::TransferOut
            | Self::Expense
            | Self::PaymentOut
            | Self::SalesReturn
            | Self::DebitNote => Direction::Decrease,
        }
    }

    /// Returns the signed balance effect of `amount` under this type.
    #[must_use]
    pub fn signed_amount(self, amount: Decimal) -> Decimal {
        self.direction().signed(amount)
    }

    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Reduce => "reduce",
            Self::TransferOut => "transfer_out",
            Self::TransferIn => "transfer_in",
            Self::Expense => "expense",
            Self::PaymentIn => "payment_in",
            Self::PaymentOut => "payment_out",
            Self::SalesReturn => "sales_return",
            Self::PurchaseReturn => "purchase_return",
            Self::CreditNote => "credit_note",
            Self::DebitNote => "debit_note",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LedgerError::InvalidTransactionType(s.to_string()))
    }
}

/// How a document was settled.
///
/// Anything that is not cash (UPI, cheque, card, bank transfer, ...) posts to
/// an explicitly chosen bank account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMode {
    /// Cash, matched case-insensitively.
    #[default]
    Cash,
    /// Any other mode, kept as entered (trimmed).
    Other(String),
}

impl PaymentMode {
    /// Normalizes a free-text payment mode.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("cash") {
            Self::Cash
        } else {
            Self::Other(trimmed.to_string())
        }
    }

    /// Returns true if this mode posts to the cash account.
    #[must_use]
    pub const fn is_cash(&self) -> bool {
        matches!(self, Self::Cash)
    }

    /// Returns the display label used in descriptions.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Cash => "Cash",
            Self::Other(mode) => mode,
        }
    }
}

impl From<String> for PaymentMode {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PaymentMode> for String {
    fn from(value: PaymentMode) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(TransactionType::Add, Direction::Increase)]
    #[case(TransactionType::Reduce, Direction::Decrease)]
    #[case(TransactionType::TransferOut, Direction::Decrease)]
    #[case(TransactionType::TransferIn, Direction::Increase)]
    #[case(TransactionType::Expense, Direction::Decrease)]
    #[case(TransactionType::PaymentIn, Direction::Increase)]
    #[case(TransactionType::PaymentOut, Direction::Decrease)]
    #[case(TransactionType::SalesReturn, Direction::Decrease)]
    #[case(TransactionType::PurchaseReturn, Direction::Increase)]
    #[case(TransactionType::CreditNote, Direction::Increase)]
    #[case(TransactionType::DebitNote, Direction::Decrease)]
    fn test_direction_table(#[case] tx_type: TransactionType, #[case] expected: Direction) {
        assert_eq!(tx_type.direction(), expected);
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(TransactionType::PaymentIn.signed_amount(dec!(200)), dec!(200));
        assert_eq!(TransactionType::PaymentOut.signed_amount(dec!(200)), dec!(-200));
        assert_eq!(Direction::Increase.inverse(), Direction::Decrease);
    }

    #[test]
    fn test_transaction_type_string_round_trip() {
        for tx_type in TransactionType::ALL {
            assert_eq!(tx_type.as_str().parse::<TransactionType>().unwrap(), tx_type);
        }
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_type_serde_matches_storage() {
        let json = serde_json::to_string(&TransactionType::PurchaseReturn).unwrap();
        assert_eq!(json, "\"purchase_return\"");
    }

    #[rstest]
    #[case("Cash", true)]
    #[case("cash", true)]
    #[case("  CASH ", true)]
    #[case("UPI", false)]
    #[case("Cash Card", false)]
    #[case("", false)]
    fn test_payment_mode_normalization(#[case] raw: &str, #[case] is_cash: bool) {
        assert_eq!(PaymentMode::parse(raw).is_cash(), is_cash);
    }

    #[test]
    fn test_payment_mode_deserializes_from_text() {
        let mode: PaymentMode = serde_json::from_str("\"cASh\"").unwrap();
        assert_eq!(mode, PaymentMode::Cash);

        let mode: PaymentMode = serde_json::from_str("\" Cheque \"").unwrap();
        assert_eq!(mode, PaymentMode::Other("Cheque".to_string()));
        assert_eq!(mode.label(), "Cheque");
    }

    #[test]
    fn test_account_kind_parse() {
        assert_eq!("Bank".parse::<AccountKind>().unwrap(), AccountKind::Bank);
        assert_eq!("cash".parse::<AccountKind>().unwrap(), AccountKind::Cash);
        assert!("wallet".parse::<AccountKind>().is_err());
    }
}
