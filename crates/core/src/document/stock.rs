//! Inventory movements caused by source documents.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::error::LedgerError;

/// How a document changes stock on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockEffect {
    /// Stock leaves the business; must be available.
    Outgoing,
    /// Stock enters the business.
    Incoming,
    /// No inventory impact.
    None,
}

impl StockEffect {
    /// The effect that undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Outgoing => Self::Incoming,
            Self::Incoming => Self::Outgoing,
            Self::None => Self::None,
        }
    }
}

/// A net quantity change for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockMovement {
    /// The item whose stock changes.
    pub item_id: Uuid,
    /// Positive quantity moved.
    pub quantity: Decimal,
    /// Whether the quantity is added or removed.
    pub effect: StockEffect,
}

impl StockMovement {
    /// Signed change to `stock_qty`.
    #[must_use]
    pub fn signed_quantity(&self) -> Decimal {
        match self.effect {
            StockEffect::Outgoing => -self.quantity,
            StockEffect::Incoming => self.quantity,
            StockEffect::None => Decimal::ZERO,
        }
    }

    /// Checks that an outgoing movement is covered by `available`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientStock` when it is not.
    pub fn ensure_available(&self, available: Decimal) -> Result<(), LedgerError> {
        if self.effect == StockEffect::Outgoing && available < self.quantity {
            return Err(LedgerError::InsufficientStock {
                item_id: self.item_id,
                available,
                required: self.quantity,
            });
        }
        Ok(())
    }
}

/// Aggregates line quantities into one movement per item.
///
/// Lines without an item are ignored. Movements are ordered by item id so
/// concurrent documents touch item rows in the same order.
#[must_use]
pub fn plan_movements<I>(effect: StockEffect, lines: I) -> Vec<StockMovement>
where
    I: IntoIterator<Item = (Option<Uuid>, Decimal)>,
{
    if effect == StockEffect::None {
        return Vec::new();
    }

    let mut per_item: BTreeMap<Uuid, Decimal> = BTreeMap::new();
    for (item_id, quantity) in lines {
        if let Some(item_id) = item_id {
            *per_item.entry(item_id).or_default() += quantity;
        }
    }

    per_item
        .into_iter()
        .filter(|(_, quantity)| *quantity > Decimal::ZERO)
        .map(|(item_id, quantity)| StockMovement {
            item_id,
            quantity,
            effect,
        })
        .collect()
}
