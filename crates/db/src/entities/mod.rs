//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod document_lines;
pub mod documents;
pub mod items;
pub mod ledger_transactions;
pub mod organization_users;
pub mod organizations;
pub mod parties;
pub mod sea_orm_active_enums;
pub mod users;
