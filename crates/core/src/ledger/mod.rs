//! Balance-mutating ledger logic.
//!
//! This module implements the rules behind every money movement:
//! - Transaction types and the direction table
//! - Payment-mode resolution to a target account
//! - Reversal of a recorded posting
//! - Balance reconciliation against the transaction log
//! - Transfer and manual adjustment validation

pub mod balance;
pub mod error;
pub mod posting;
pub mod reversal;
pub mod transfer;
pub mod types;

#[cfg(test)]
mod posting_props;

pub use balance::{Reconciliation, ensure_sufficient_balance};
pub use error::LedgerError;
pub use posting::{
    PostedEntry, PostingOutcome, PostingRequest, PostingService, PostingTarget, SkipReason,
    SourceRef,
};
pub use reversal::{RecordedPosting, ReversalOutcome};
pub use transfer::{
    ExternalBeneficiary, MIN_TRANSFER_AMOUNT, is_valid_ifsc, mask_account_number,
    validate_adjustment_type, validate_amount, validate_internal_transfer,
};
pub use types::{AccountKind, CASH_ACCOUNT_NAME, Direction, PaymentMode, TransactionType};
