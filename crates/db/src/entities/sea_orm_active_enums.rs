//! Postgres enum types and their mapping to domain enums.

use khata_core::document::{DocumentKind, PaymentStatus as DomainPaymentStatus};
use khata_core::ledger::{AccountKind, TransactionType as DomainTransactionType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `account_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Bank account.
    #[sea_orm(string_value = "bank")]
    Bank,
    /// Cash drawer.
    #[sea_orm(string_value = "cash")]
    Cash,
}

impl From<AccountKind> for AccountType {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Bank => Self::Bank,
            AccountKind::Cash => Self::Cash,
        }
    }
}

impl From<AccountType> for AccountKind {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Bank => Self::Bank,
            AccountType::Cash => Self::Cash,
        }
    }
}

/// `ledger_transaction_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money added.
    #[sea_orm(string_value = "add")]
    Add,
    /// Money removed.
    #[sea_orm(string_value = "reduce")]
    Reduce,
    /// Transfer out.
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    /// Transfer in.
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Payment in.
    #[sea_orm(string_value = "payment_in")]
    PaymentIn,
    /// Payment out.
    #[sea_orm(string_value = "payment_out")]
    PaymentOut,
    /// Sales return refund.
    #[sea_orm(string_value = "sales_return")]
    SalesReturn,
    /// Purchase return refund.
    #[sea_orm(string_value = "purchase_return")]
    PurchaseReturn,
    /// Credit note settlement.
    #[sea_orm(string_value = "credit_note")]
    CreditNote,
    /// Debit note settlement.
    #[sea_orm(string_value = "debit_note")]
    DebitNote,
}

impl From<DomainTransactionType> for TransactionType {
    fn from(value: DomainTransactionType) -> Self {
        match value {
            DomainTransactionType::Add => Self::Add,
            DomainTransactionType::Reduce => Self::Reduce,
            DomainTransactionType::TransferOut => Self::TransferOut,
            DomainTransactionType::TransferIn => Self::TransferIn,
            DomainTransactionType::Expense => Self::Expense,
            DomainTransactionType::PaymentIn => Self::PaymentIn,
            DomainTransactionType::PaymentOut => Self::PaymentOut,
            DomainTransactionType::SalesReturn => Self::SalesReturn,
            DomainTransactionType::PurchaseReturn => Self::PurchaseReturn,
            DomainTransactionType::CreditNote => Self::CreditNote,
            DomainTransactionType::DebitNote => Self::DebitNote,
        }
    }
}

impl From<TransactionType> for DomainTransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Add => Self::Add,
            TransactionType::Reduce => Self::Reduce,
            TransactionType::TransferOut => Self::TransferOut,
            TransactionType::TransferIn => Self::TransferIn,
            TransactionType::Expense => Self::Expense,
            TransactionType::PaymentIn => Self::PaymentIn,
            TransactionType::PaymentOut => Self::PaymentOut,
            TransactionType::SalesReturn => Self::SalesReturn,
            TransactionType::PurchaseReturn => Self::PurchaseReturn,
            TransactionType::CreditNote => Self::CreditNote,
            TransactionType::DebitNote => Self::DebitNote,
        }
    }
}

/// `document_kind` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_kind")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Sales invoice.
    #[sea_orm(string_value = "sales_invoice")]
    SalesInvoice,
    /// Purchase invoice.
    #[sea_orm(string_value = "purchase_invoice")]
    PurchaseInvoice,
    /// Payment in.
    #[sea_orm(string_value = "payment_in")]
    PaymentIn,
    /// Payment out.
    #[sea_orm(string_value = "payment_out")]
    PaymentOut,
    /// Credit note.
    #[sea_orm(string_value = "credit_note")]
    CreditNote,
    /// Debit note.
    #[sea_orm(string_value = "debit_note")]
    DebitNote,
    /// Sales return.
    #[sea_orm(string_value = "sales_return")]
    SalesReturn,
    /// Purchase return.
    #[sea_orm(string_value = "purchase_return")]
    PurchaseReturn,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// POS sale.
    #[sea_orm(string_value = "pos_sale")]
    PosSale,
}

impl From<DocumentKind> for DocumentType {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::SalesInvoice => Self::SalesInvoice,
            DocumentKind::PurchaseInvoice => Self::PurchaseInvoice,
            DocumentKind::PaymentIn => Self::PaymentIn,
            DocumentKind::PaymentOut => Self::PaymentOut,
            DocumentKind::CreditNote => Self::CreditNote,
            DocumentKind::DebitNote => Self::DebitNote,
            DocumentKind::SalesReturn => Self::SalesReturn,
            DocumentKind::PurchaseReturn => Self::PurchaseReturn,
            DocumentKind::Expense => Self::Expense,
            DocumentKind::PosSale => Self::PosSale,
        }
    }
}

impl From<DocumentType> for DocumentKind {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::SalesInvoice => Self::SalesInvoice,
            DocumentType::PurchaseInvoice => Self::PurchaseInvoice,
            DocumentType::PaymentIn => Self::PaymentIn,
            DocumentType::PaymentOut => Self::PaymentOut,
            DocumentType::CreditNote => Self::CreditNote,
            DocumentType::DebitNote => Self::DebitNote,
            DocumentType::SalesReturn => Self::SalesReturn,
            DocumentType::PurchaseReturn => Self::PurchaseReturn,
            DocumentType::Expense => Self::Expense,
            DocumentType::PosSale => Self::PosSale,
        }
    }
}

/// `payment_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing settled.
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Partly settled.
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Fully settled.
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl From<DomainPaymentStatus> for PaymentStatus {
    fn from(value: DomainPaymentStatus) -> Self {
        match value {
            DomainPaymentStatus::Unpaid => Self::Unpaid,
            DomainPaymentStatus::Partial => Self::Partial,
            DomainPaymentStatus::Paid => Self::Paid,
        }
    }
}

/// `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Organization owner.
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
}
