//! Item stock side effects of documents.

use khata_core::document::{StockEffect, StockMovement};
use khata_core::ledger::LedgerError;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Statement};
use tracing::debug;
use uuid::Uuid;

use super::error::StoreError;
use crate::entities::items;

/// Applies planned stock movements inside the caller's transaction.
pub struct StockRepository;

impl StockRepository {
    /// Applies every movement, failing the whole call on the first shortfall.
    ///
    /// Outgoing movements are a single conditional decrement, so the stock
    /// check and the update cannot interleave with another document.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStock` or `ItemNotFound`.
    pub async fn apply<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        movements: &[StockMovement],
    ) -> Result<(), StoreError> {
        for movement in movements {
            let sql = match movement.effect {
                StockEffect::None => continue,
                StockEffect::Incoming => {
                    r"UPDATE items SET stock_qty = stock_qty + $1, updated_at = now()
                      WHERE id = $2 AND organization_id = $3
                      RETURNING stock_qty"
                }
                StockEffect::Outgoing => {
                    r"UPDATE items SET stock_qty = stock_qty - $1, updated_at = now()
                      WHERE id = $2 AND organization_id = $3 AND stock_qty >= $1
                      RETURNING stock_qty"
                }
            };

            let row = conn
                .query_one(Statement::from_sql_and_values(
                    conn.get_database_backend(),
                    sql,
                    [
                        movement.quantity.into(),
                        movement.item_id.into(),
                        organization_id.into(),
                    ],
                ))
                .await?;

            match row {
                Some(row) => {
                    let stock_qty: Decimal = row.try_get("", "stock_qty")?;
                    debug!(
                        item_id = %movement.item_id,
                        change = %movement.signed_quantity(),
                        stock_qty = %stock_qty,
                        "Stock updated"
                    );
                }
                None => return Err(Self::explain_miss(conn, organization_id, movement).await),
            }
        }
        Ok(())
    }

    /// Works out why a movement updated no row.
    async fn explain_miss<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        movement: &StockMovement,
    ) -> StoreError {
        let item = items::Entity::find_by_id(movement.item_id)
            .filter(items::Column::OrganizationId.eq(organization_id))
            .one(conn)
            .await;

        match item {
            Ok(Some(item)) => match movement.ensure_available(item.stock_qty) {
                Err(e) => e.into(),
                Ok(()) => LedgerError::Internal(format!(
                    "stock update for item {} matched no row",
                    movement.item_id
                ))
                .into(),
            },
            Ok(None) => LedgerError::ItemNotFound(movement.item_id).into(),
            Err(e) => e.into(),
        }
    }
}
