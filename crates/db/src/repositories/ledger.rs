//! Ledger transaction log.
//!
//! Rows are appended and deleted; there is no update. A correction is a
//! delete followed by a new append.

use chrono::{NaiveDate, Utc};
use khata_core::ledger::{
    ExternalBeneficiary, LedgerError, PostingRequest, SourceRef, TransactionType,
};
use khata_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::account::AccountRepository;
use super::error::StoreError;
use crate::entities::{ledger_transactions, sea_orm_active_enums::DocumentType};

/// A transaction about to be written.
#[derive(Debug, Clone)]
pub struct NewLedgerTransaction {
    /// Pre-generated id, so paired rows can reference each other.
    pub id: Uuid,
    /// Organization ID.
    pub organization_id: Uuid,
    /// Account whose balance changed.
    pub account_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Type; fixes the direction.
    pub transaction_type: TransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Document this transaction settles.
    pub source: Option<SourceRef>,
    /// Counterpart account of a transfer.
    pub related_account_id: Option<Uuid>,
    /// Counterpart row of a transfer.
    pub related_transaction_id: Option<Uuid>,
    /// Beneficiary of an external transfer.
    pub external: Option<ExternalBeneficiary>,
}

impl NewLedgerTransaction {
    /// A plain entry with no linkage.
    #[must_use]
    pub fn new(
        organization_id: Uuid,
        account_id: Uuid,
        user_id: Uuid,
        transaction_type: TransactionType,
        amount: Decimal,
        transaction_date: NaiveDate,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id,
            account_id,
            user_id,
            transaction_type,
            amount,
            transaction_date,
            description,
            source: None,
            related_account_id: None,
            related_transaction_id: None,
            external: None,
        }
    }

    /// The entry recording `request` against `account_id`.
    #[must_use]
    pub fn for_posting(request: &PostingRequest, account_id: Uuid) -> Self {
        Self {
            source: request.source,
            ..Self::new(
                request.organization_id,
                account_id,
                request.user_id,
                request.transaction_type,
                request.amount,
                request.transaction_date,
                request.description.clone(),
            )
        }
    }
}

/// Ledger transaction repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an account's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn list_for_account(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<PageResponse<ledger_transactions::Model>, StoreError> {
        let page = page.normalized();
        AccountRepository::find(&self.db, organization_id, account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let paginator = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::OrganizationId.eq(organization_id))
            .filter(ledger_transactions::Column::AccountId.eq(account_id))
            .order_by_desc(ledger_transactions::Column::TransactionDate)
            .order_by_desc(ledger_transactions::Column::CreatedAt)
            .order_by_desc(ledger_transactions::Column::Id)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(u64::from(page.page) - 1).await?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Appends a transaction row.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAmount`/`NegativeAmount` for a non-positive amount, or a
    /// database error.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        entry: NewLedgerTransaction,
    ) -> Result<ledger_transactions::Model, StoreError> {
        if entry.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount.into());
        }
        if entry.amount.is_zero() {
            return Err(LedgerError::ZeroAmount.into());
        }

        let external = entry.external;
        let row = ledger_transactions::ActiveModel {
            id: Set(entry.id),
            organization_id: Set(entry.organization_id),
            account_id: Set(entry.account_id),
            user_id: Set(entry.user_id),
            transaction_type: Set(entry.transaction_type.into()),
            amount: Set(entry.amount),
            transaction_date: Set(entry.transaction_date),
            description: Set(entry.description),
            source_kind: Set(entry.source.map(|s| DocumentType::from(s.kind))),
            source_document_id: Set(entry.source.map(|s| s.document_id)),
            related_account_id: Set(entry.related_account_id),
            related_transaction_id: Set(entry.related_transaction_id),
            is_external_transfer: Set(external.is_some()),
            external_account_holder: Set(external.as_ref().map(|b| b.account_holder.clone())),
            external_account_number: Set(external.as_ref().map(|b| b.account_number.clone())),
            external_bank_name: Set(external.as_ref().map(|b| b.bank_name.clone())),
            external_ifsc_code: Set(external.map(|b| b.ifsc_code)),
            created_at: Set(Utc::now().into()),
        };

        Ok(row.insert(conn).await?)
    }

    /// Finds the posting recorded for a source document.
    ///
    /// Only the oldest match is returned, so a reversal acts on one row at most.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_source<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        source_document_id: Uuid,
    ) -> Result<Option<ledger_transactions::Model>, DbErr> {
        ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::OrganizationId.eq(organization_id))
            .filter(ledger_transactions::Column::SourceDocumentId.eq(source_document_id))
            .order_by_asc(ledger_transactions::Column::CreatedAt)
            .order_by_asc(ledger_transactions::Column::Id)
            .one(conn)
            .await
    }

    /// Deletes a transaction row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = ledger_transactions::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }
}
