//! Transfer and manual adjustment rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use super::types::TransactionType;

/// Minimum amount accepted for a manual adjustment or transfer.
pub const MIN_TRANSFER_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Checks that a user-entered amount is at least 0.01.
///
/// # Errors
///
/// Returns `ZeroAmount` or `NegativeAmount` otherwise.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount);
    }
    if amount < MIN_TRANSFER_AMOUNT {
        return Err(LedgerError::ZeroAmount);
    }
    Ok(())
}

/// Checks a manual adjustment type: only `add` and `reduce` are allowed.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAdjustmentType` for anything else.
pub fn validate_adjustment_type(transaction_type: TransactionType) -> Result<(), LedgerError> {
    match transaction_type {
        TransactionType::Add | TransactionType::Reduce => Ok(()),
        other => Err(LedgerError::InvalidAdjustmentType(other.to_string())),
    }
}

/// Checks that an internal transfer moves money between two accounts.
///
/// # Errors
///
/// Returns `LedgerError::SameAccountTransfer` if both ids match.
pub fn validate_internal_transfer(
    from_account_id: Uuid,
    to_account_id: Uuid,
) -> Result<(), LedgerError> {
    if from_account_id == to_account_id {
        return Err(LedgerError::SameAccountTransfer);
    }
    Ok(())
}

/// Bank details of a beneficiary outside the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalBeneficiary {
    /// Account holder name.
    pub account_holder: String,
    /// Account number.
    pub account_number: String,
    /// Bank name.
    pub bank_name: String,
    /// IFSC code (`AAAA0XXXXXX`).
    pub ifsc_code: String,
}

impl ExternalBeneficiary {
    /// Trims all fields and upper-cases the IFSC code, then validates.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for blank fields and `InvalidIfscCode` for a
    /// malformed IFSC code.
    pub fn normalized(self) -> Result<Self, LedgerError> {
        let normalized = Self {
            account_holder: self.account_holder.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            bank_name: self.bank_name.trim().to_string(),
            ifsc_code: self.ifsc_code.trim().to_ascii_uppercase(),
        };

        if normalized.account_holder.is_empty() {
            return Err(LedgerError::MissingField("external_account_holder"));
        }
        if normalized.account_number.is_empty() {
            return Err(LedgerError::MissingField("external_account_number"));
        }
        if normalized.bank_name.is_empty() {
            return Err(LedgerError::MissingField("external_bank_name"));
        }
        if !is_valid_ifsc(&normalized.ifsc_code) {
            return Err(LedgerError::InvalidIfscCode(normalized.ifsc_code));
        }
        Ok(normalized)
    }
}

/// Matches `^[A-Z]{4}0[A-Z0-9]{6}$`.
#[must_use]
pub fn is_valid_ifsc(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 11
        && bytes[..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Masks all but the last four characters of an account number.
#[must_use]
pub fn mask_account_number(account_number: &str) -> String {
    let chars: Vec<char> = account_number.chars().collect();
    if chars.len() <= 4 {
        return account_number.to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}
