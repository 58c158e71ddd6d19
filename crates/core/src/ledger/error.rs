//! Ledger error types for validation and state errors.
//!
//! Covers everything that can go wrong while posting to an account, reversing
//! a posting, moving stock or building a source document.

use khata_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger and document operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount cannot be zero.
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Amount cannot be negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// A numeric field is outside its allowed range.
    #[error("{field} must be between 0 and 100, got {value}")]
    InvalidPercentage {
        /// Name of the offending field.
        field: &'static str,
        /// The value that was supplied.
        value: Decimal,
    },

    /// A monetary or quantity field is negative.
    #[error("{0} cannot be negative")]
    NegativeField(&'static str),

    /// A monetary or quantity figure is too large to record.
    #[error("{0} is too large")]
    AmountOutOfRange(&'static str),

    /// Unknown account kind.
    #[error("Invalid account type: {0}")]
    InvalidAccountKind(String),

    /// Unknown transaction type.
    #[error("Invalid transaction type: {0}")]
    InvalidTransactionType(String),

    /// Unknown document kind.
    #[error("Invalid document type: {0}")]
    InvalidDocumentKind(String),

    /// Transaction type not allowed for a manual adjustment.
    #[error("Manual adjustments must be 'add' or 'reduce', got {0}")]
    InvalidAdjustmentType(String),

    /// Document needs at least one line item.
    #[error("Document must have at least one item")]
    EmptyDocument,

    /// Required field missing.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Transfer source and destination are the same account.
    #[error("Source and destination accounts must be different")]
    SameAccountTransfer,

    /// IFSC code does not match the expected format.
    #[error("Invalid IFSC code: {0}")]
    InvalidIfscCode(String),

    // ========== Business Rule Errors ==========
    /// Account balance is lower than the amount being taken out.
    #[error("Insufficient balance in account {account_id}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account_id: Uuid,
        /// Current balance.
        available: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// Not enough stock for an outgoing movement.
    #[error("Insufficient stock for item {item_id}: available {available}, required {required}")]
    InsufficientStock {
        /// The item being moved.
        item_id: Uuid,
        /// Stock on hand.
        available: Decimal,
        /// Quantity required.
        required: Decimal,
    },

    /// Account still has ledger transactions referencing it.
    #[error("Account {0} has transactions and cannot be deleted")]
    AccountHasTransactions(Uuid),

    // ========== Not Found Errors ==========
    /// Account not found in this organization.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Document not found in this organization.
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Item not found in this organization.
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    /// Party not found in this organization.
    #[error("Party not found: {0}")]
    PartyNotFound(Uuid),

    // ========== Conflict Errors ==========
    /// A document with the same number already exists.
    #[error("Document number {0} already exists")]
    DuplicateDocumentNumber(String),

    /// An account with the same name and type already exists.
    #[error("Account {0} already exists")]
    DuplicateAccountName(String),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidPercentage { .. } => "INVALID_PERCENTAGE",
            Self::NegativeField(_) => "NEGATIVE_VALUE",
            Self::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
            Self::InvalidAccountKind(_) => "INVALID_ACCOUNT_TYPE",
            Self::InvalidTransactionType(_) => "INVALID_TRANSACTION_TYPE",
            Self::InvalidDocumentKind(_) => "INVALID_DOCUMENT_TYPE",
            Self::InvalidAdjustmentType(_) => "INVALID_ADJUSTMENT_TYPE",
            Self::EmptyDocument => "EMPTY_DOCUMENT",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::SameAccountTransfer => "SAME_ACCOUNT_TRANSFER",
            Self::InvalidIfscCode(_) => "INVALID_IFSC_CODE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::AccountHasTransactions(_) => "ACCOUNT_HAS_TRANSACTIONS",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::DuplicateDocumentNumber(_) => "DUPLICATE_DOCUMENT_NUMBER",
            Self::DuplicateAccountName(_) => "DUPLICATE_ACCOUNT_NAME",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::ZeroAmount
            | Self::NegativeAmount
            | Self::InvalidPercentage { .. }
            | Self::NegativeField(_)
            | Self::AmountOutOfRange(_)
            | Self::InvalidAccountKind(_)
            | Self::InvalidTransactionType(_)
            | Self::InvalidDocumentKind(_)
            | Self::InvalidAdjustmentType(_)
            | Self::EmptyDocument
            | Self::MissingField(_)
            | Self::SameAccountTransfer
            | Self::InvalidIfscCode(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_)
            | Self::DocumentNotFound(_)
            | Self::ItemNotFound(_)
            | Self::PartyNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateDocumentNumber(_) | Self::DuplicateAccountName(_) => 409,

            // 422 Unprocessable - business rules
            Self::InsufficientBalance { .. }
            | Self::InsufficientStock { .. }
            | Self::AccountHasTransactions(_) => 422,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.http_status_code() {
            400 => Self::Validation(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            422 => Self::BusinessRule(message),
            _ => match err {
                LedgerError::Database(msg) => Self::Database(msg),
                _ => Self::Internal(message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::ZeroAmount.error_code(), "ZERO_AMOUNT");
        assert_eq!(
            LedgerError::InsufficientStock {
                item_id: Uuid::nil(),
                available: dec!(5),
                required: dec!(10),
            }
            .error_code(),
            "INSUFFICIENT_STOCK"
        );
        assert_eq!(
            LedgerError::DuplicateDocumentNumber("INV-1".into()).error_code(),
            "DUPLICATE_DOCUMENT_NUMBER"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::SameAccountTransfer.http_status_code(), 400);
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::DuplicateDocumentNumber(String::new()).http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::InsufficientBalance {
                account_id: Uuid::nil(),
                available: dec!(10),
                requested: dec!(20),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::Database("test".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_conversion_to_app_error() {
        let err: AppError = LedgerError::InsufficientStock {
            item_id: Uuid::nil(),
            available: dec!(5),
            required: dec!(10),
        }
        .into();
        assert_eq!(err.status_code(), 422);
        assert!(err.to_string().contains("Insufficient stock"));

        let err: AppError = LedgerError::DocumentNotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);

        let err: AppError = LedgerError::Database("boom".into()).into();
        assert!(matches!(err, AppError::Database(msg) if msg == "boom"));
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::InvalidPercentage {
            field: "tax_percent",
            value: dec!(120),
        };
        assert_eq!(err.to_string(), "tax_percent must be between 0 and 100, got 120");
    }
}
