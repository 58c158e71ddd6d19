//! `SeaORM` Entity for accounts table.
//!
//! `current_balance` is only ever changed by an atomic increment in
//! `AccountRepository::apply_delta`; nothing writes it through an active model
//! after the row is inserted.

use super::sea_orm_active_enums::AccountType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub account_name: String,
    pub account_type: AccountType,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_balance: Decimal,
    pub as_of_date: Date,
    pub bank_account_no: Option<String>,
    pub ifsc_code: Option<String>,
    pub account_holder_name: Option<String>,
    pub upi_id: Option<String>,
    pub bank_name: Option<String>,
    pub branch_name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(has_many = "super::ledger_transactions::Entity")]
    LedgerTransactions,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::ledger_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
