//! Source documents: invoices, notes, returns, payments, expenses and POS bills.
//!
//! This module holds the document arithmetic shared by every kind:
//! - Per-kind posting policy (transaction type, direction, stock effect, description)
//! - Line and header totals
//! - Payment status from total and settled amount
//! - Stock movement planning
//! - Document numbering

pub mod kind;
pub mod numbering;
pub mod status;
pub mod stock;
pub mod totals;

#[cfg(test)]
mod totals_props;

pub use kind::DocumentKind;
pub use numbering::{format_document_number, next_number, resolve_prefix};
pub use status::{PaymentStatus, Settlement};
pub use stock::{StockEffect, StockMovement, plan_movements};
pub use totals::{
    DocumentAdjustments, DocumentTotals, LineAmounts, LineInput, MONEY_SCALE, check_money,
    compute_totals, round_money,
};
