//! `SeaORM` Entity for items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub unit: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub sale_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub purchase_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub stock_qty: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
