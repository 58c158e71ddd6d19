//! Source document kinds and their posting policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::stock::StockEffect;
use crate::ledger::error::LedgerError;
use crate::ledger::types::{Direction, PaymentMode, TransactionType};

/// Kind of business document that can settle money against an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Sale to a customer.
    SalesInvoice,
    /// Purchase from a supplier.
    PurchaseInvoice,
    /// Money received from a party.
    PaymentIn,
    /// Money paid to a party.
    PaymentOut,
    /// Credit issued to a customer.
    CreditNote,
    /// Debit raised against a supplier.
    DebitNote,
    /// Goods returned by a customer.
    SalesReturn,
    /// Goods returned to a supplier.
    PurchaseReturn,
    /// Business expense.
    Expense,
    /// Point-of-sale bill.
    PosSale,
}

impl DocumentKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::SalesInvoice,
        Self::PurchaseInvoice,
        Self::PaymentIn,
        Self::PaymentOut,
        Self::CreditNote,
        Self::DebitNote,
        Self::SalesReturn,
        Self::PurchaseReturn,
        Self::Expense,
        Self::PosSale,
    ];

    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SalesInvoice => "sales_invoice",
            Self::PurchaseInvoice => "purchase_invoice",
            Self::PaymentIn => "payment_in",
            Self::PaymentOut => "payment_out",
            Self::CreditNote => "credit_note",
            Self::DebitNote => "debit_note",
            Self::SalesReturn => "sales_return",
            Self::PurchaseReturn => "purchase_return",
            Self::Expense => "expense",
            Self::PosSale => "pos_sale",
        }
    }

    /// Ledger transaction type written when this document is settled.
    #[must_use]
    pub const fn transaction_type(self) -> TransactionType {
        match self {
            Self::SalesInvoice | Self::PosSale => TransactionType::Add,
            Self::PurchaseInvoice => TransactionType::Reduce,
            Self::PaymentIn => TransactionType::PaymentIn,
            Self::PaymentOut => TransactionType::PaymentOut,
            Self::CreditNote => TransactionType::CreditNote,
            Self::DebitNote => TransactionType::DebitNote,
            Self::SalesReturn => TransactionType::SalesReturn,
            Self::PurchaseReturn => TransactionType::PurchaseReturn,
            Self::Expense => TransactionType::Expense,
        }
    }

    /// Direction of the settlement on the target account.
    #[must_use]
    pub const fn direction(self) -> Direction {
        self.transaction_type().direction()
    }

    /// How this document moves inventory when created.
    #[must_use]
    pub const fn stock_effect(self) -> StockEffect {
        match self {
            Self::SalesInvoice | Self::PosSale | Self::PurchaseReturn => StockEffect::Outgoing,
            Self::PurchaseInvoice | Self::SalesReturn => StockEffect::Incoming,
            Self::PaymentIn
            | Self::PaymentOut
            | Self::CreditNote
            | Self::DebitNote
            | Self::Expense => StockEffect::None,
        }
    }

    /// Payments carry a bare amount instead of line items.
    #[must_use]
    pub const fn has_lines(self) -> bool {
        !matches!(self, Self::PaymentIn | Self::PaymentOut)
    }

    /// Prefix used when the caller does not supply one.
    #[must_use]
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::SalesInvoice => "INV-",
            Self::PurchaseInvoice => "PUR-",
            Self::PaymentIn => "PIN-",
            Self::PaymentOut => "POUT-",
            Self::CreditNote => "CN-",
            Self::DebitNote => "DN-",
            Self::SalesReturn => "SR-",
            Self::PurchaseReturn => "PR-",
            Self::Expense => "EXP-",
            Self::PosSale => "POS-",
        }
    }

    /// Minimum digits of the formatted number, zero padded.
    #[must_use]
    pub const fn number_width(self) -> usize {
        match self {
            Self::PosSale => 6,
            _ => 0,
        }
    }

    /// Builds the ledger description for a settlement of this document.
    ///
    /// Reports parse these strings, so the formats are fixed.
    #[must_use]
    pub fn describe(
        self,
        document_number: &str,
        mode: &PaymentMode,
        category: Option<&str>,
    ) -> String {
        match self {
            Self::SalesInvoice => {
                format!("Payment received for Sales Invoice {document_number} - {mode}")
            }
            Self::PurchaseInvoice => {
                format!("Payment made for Purchase Invoice {document_number} - {mode}")
            }
            Self::PaymentIn => format!("Payment In: {document_number}"),
            Self::PaymentOut => format!("Payment Out: {document_number}"),
            Self::CreditNote => format!("Credit Note Payment: {document_number}"),
            Self::DebitNote => format!("Debit Note Payment: {document_number}"),
            Self::SalesReturn => format!("Sales Return Refund: {document_number}"),
            Self::PurchaseReturn => format!("Purchase Return Refund: {document_number}"),
            Self::Expense => match category.filter(|c| !c.trim().is_empty()) {
                Some(category) => format!("Expense: {document_number} - {category}"),
                None => format!("Expense: {document_number}"),
            },
            Self::PosSale => format!("POS Sale - Invoice: {document_number}"),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| LedgerError::InvalidDocumentKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DocumentKind::SalesInvoice, Direction::Increase)]
    #[case(DocumentKind::PurchaseInvoice, Direction::Decrease)]
    #[case(DocumentKind::PaymentIn, Direction::Increase)]
    #[case(DocumentKind::PaymentOut, Direction::Decrease)]
    #[case(DocumentKind::Expense, Direction::Decrease)]
    #[case(DocumentKind::CreditNote, Direction::Increase)]
    #[case(DocumentKind::DebitNote, Direction::Decrease)]
    #[case(DocumentKind::SalesReturn, Direction::Decrease)]
    #[case(DocumentKind::PurchaseReturn, Direction::Increase)]
    #[case(DocumentKind::PosSale, Direction::Increase)]
    fn test_settlement_direction(#[case] kind: DocumentKind, #[case] expected: Direction) {
        assert_eq!(kind.direction(), expected);
    }

    #[rstest]
    #[case(DocumentKind::SalesInvoice, StockEffect::Outgoing)]
    #[case(DocumentKind::PosSale, StockEffect::Outgoing)]
    #[case(DocumentKind::PurchaseReturn, StockEffect::Outgoing)]
    #[case(DocumentKind::PurchaseInvoice, StockEffect::Incoming)]
    #[case(DocumentKind::SalesReturn, StockEffect::Incoming)]
    #[case(DocumentKind::CreditNote, StockEffect::None)]
    #[case(DocumentKind::PaymentIn, StockEffect::None)]
    fn test_stock_effect(#[case] kind: DocumentKind, #[case] expected: StockEffect) {
        assert_eq!(kind.stock_effect(), expected);
    }

    #[test]
    fn test_storage_name_round_trip() {
        for kind in DocumentKind::ALL {
            assert_eq!(kind.as_str().parse::<DocumentKind>().unwrap(), kind);
        }
        assert!("quotation".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_descriptions() {
        let cash = PaymentMode::Cash;
        let upi = PaymentMode::parse("UPI");

        assert_eq!(
            DocumentKind::SalesInvoice.describe("INV-12", &upi, None),
            "Payment received for Sales Invoice INV-12 - UPI"
        );
        assert_eq!(
            DocumentKind::PaymentOut.describe("POUT-3", &cash, None),
            "Payment Out: POUT-3"
        );
        assert_eq!(
            DocumentKind::Expense.describe("EXP-9", &cash, Some("Rent")),
            "Expense: EXP-9 - Rent"
        );
        assert_eq!(
            DocumentKind::Expense.describe("EXP-9", &cash, Some("  ")),
            "Expense: EXP-9"
        );
        assert_eq!(
            DocumentKind::PosSale.describe("POS-000042", &cash, None),
            "POS Sale - Invoice: POS-000042"
        );
    }

    #[test]
    fn test_payments_have_no_lines() {
        assert!(!DocumentKind::PaymentIn.has_lines());
        assert!(!DocumentKind::PaymentOut.has_lines());
        assert!(DocumentKind::Expense.has_lines());
    }
}
