//! `SeaORM` Entity for ledger_transactions table.
//!
//! Rows are inserted and deleted, never updated.

use super::sea_orm_active_enums::{DocumentType, TransactionType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub transaction_date: Date,
    pub description: String,
    pub source_kind: Option<DocumentType>,
    pub source_document_id: Option<Uuid>,
    pub related_account_id: Option<Uuid>,
    pub related_transaction_id: Option<Uuid>,
    pub is_external_transfer: bool,
    pub external_account_holder: Option<String>,
    pub external_account_number: Option<String>,
    pub external_bank_name: Option<String>,
    pub external_ifsc_code: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
