//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//!
//! The ledger primitives (`AccountRepository` balance functions,
//! `LedgerRepository`, `PostingEngine`, `ReversalEngine`, `StockRepository`)
//! take a connection argument so services can run them inside one transaction.

pub mod account;
pub mod document;
pub mod error;
pub mod ledger;
pub mod organization;
pub mod posting;
pub mod reversal;
pub mod stock;
pub mod transfer;
pub mod user;

pub use account::{AccountRepository, BankDetails, CreateAccountInput, UpdateAccountInput};
pub use document::{
    CreateDocumentInput, DocumentChange, DocumentDeletion, DocumentRecord, DocumentService,
    NextNumber, SettlementUpdate,
};
pub use error::StoreError;
pub use ledger::{LedgerRepository, NewLedgerTransaction};
pub use organization::OrganizationRepository;
pub use posting::PostingEngine;
pub use reversal::ReversalEngine;
pub use stock::StockRepository;
pub use transfer::{
    AdjustmentInput, AdjustmentResult, ExternalTransferInput, InternalTransferInput,
    TransferResult, TransferService,
};
pub use user::UserRepository;
