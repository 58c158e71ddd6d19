//! Core business logic for Khata.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Balance postings, reversals, transfers and reconciliation
//! - `document` - Source documents: totals, payment status, stock movements, numbering

pub mod document;
pub mod ledger;
