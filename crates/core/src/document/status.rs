//! Payment status derived from a document's total and settled amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much of a document has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing settled.
    Unpaid,
    /// Partly settled.
    Partial,
    /// Fully settled (or over-settled).
    Paid,
}

impl PaymentStatus {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }
}

/// Outstanding balance and status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Remaining amount owed, never negative.
    pub balance: Decimal,
    /// Status fully determined by `balance`.
    pub status: PaymentStatus,
}

impl Settlement {
    /// Evaluates a document with `total` of which `settled` has been paid.
    #[must_use]
    pub fn evaluate(total: Decimal, settled: Decimal) -> Self {
        if settled >= total {
            Self {
                balance: Decimal::ZERO,
                status: PaymentStatus::Paid,
            }
        } else if settled > Decimal::ZERO {
            Self {
                balance: total - settled,
                status: PaymentStatus::Partial,
            }
        } else {
            Self {
                balance: total,
                status: PaymentStatus::Unpaid,
            }
        }
    }
}
