//! `SeaORM` Entity for documents table.
//!
//! One row per source document of any kind; `kind` decides which optional
//! columns are meaningful.

use super::sea_orm_active_enums::{DocumentType, PaymentStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub kind: DocumentType,
    pub party_id: Option<Uuid>,
    pub prefix: String,
    pub number: i64,
    pub document_number: String,
    pub document_date: Date,
    pub due_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub additional_charges: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub round_off: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub settled_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_mode: String,
    pub bank_account_id: Option<Uuid>,
    pub category: Option<String>,
    pub linked_document_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parties::Entity",
        from = "Column::PartyId",
        to = "super::parties::Column::Id"
    )]
    Parties,
    #[sea_orm(has_many = "super::document_lines::Entity")]
    DocumentLines,
}

impl Related<super::parties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parties.def()
    }
}

impl Related<super::document_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
