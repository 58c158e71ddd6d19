//! Document service: source documents and their ledger and stock effects.
//!
//! Every operation opens one database transaction. Header, lines, stock,
//! balance and transaction log commit together or not at all.

use chrono::{NaiveDate, Utc};
use khata_core::document::{
    DocumentAdjustments, DocumentKind, DocumentTotals, LineAmounts, LineInput, Settlement,
    check_money, compute_totals, format_document_number, next_number, plan_movements,
    resolve_prefix, round_money,
};
use khata_core::ledger::{
    LedgerError, PaymentMode, PostingOutcome, PostingRequest, ReversalOutcome, SourceRef,
};
use khata_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::error::{StoreError, on_unique_violation};
use super::posting::PostingEngine;
use super::reversal::ReversalEngine;
use super::stock::StockRepository;
use crate::entities::{document_lines, documents, parties, sea_orm_active_enums::DocumentType};

/// Input for creating a document of any kind.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Kind of document.
    pub kind: DocumentKind,
    /// Customer or supplier.
    pub party_id: Option<Uuid>,
    /// Number prefix; the kind's default when absent.
    pub prefix: Option<String>,
    /// Explicit number; the next free number when absent.
    pub number: Option<i64>,
    /// Document date, also the posting date.
    pub document_date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Lines (ignored for payments).
    pub lines: Vec<LineInput>,
    /// Document-level discount, charges and rounding.
    pub adjustments: DocumentAdjustments,
    /// Amount of a payment, which is both its total and its settlement.
    pub amount: Option<Decimal>,
    /// Amount paid or received now (ignored for payments).
    pub settled_amount: Decimal,
    /// How it was settled.
    pub payment_mode: PaymentMode,
    /// Bank account for non-cash modes.
    pub bank_account_id: Option<Uuid>,
    /// Expense category.
    pub category: Option<String>,
    /// Invoice a note or return refers to.
    pub linked_document_id: Option<Uuid>,
    /// Notes.
    pub notes: Option<String>,
}

/// Editable settlement fields. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct SettlementUpdate {
    /// New settlement amount (for payments, the new amount).
    pub settled_amount: Option<Decimal>,
    /// New payment mode.
    pub payment_mode: Option<PaymentMode>,
    /// New bank account.
    pub bank_account_id: Option<Option<Uuid>>,
    /// New notes.
    pub notes: Option<Option<String>>,
}

/// A document with its lines.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    /// Header.
    pub document: documents::Model,
    /// Lines in entry order.
    pub lines: Vec<document_lines::Model>,
}

/// Result of creating or editing a document.
#[derive(Debug, Clone)]
pub struct DocumentChange {
    /// The document as stored.
    pub record: DocumentRecord,
    /// Prior posting undone by an edit (`None` on create).
    pub reversal: Option<ReversalOutcome>,
    /// New posting.
    pub posting: PostingOutcome,
}

/// Result of deleting a document.
#[derive(Debug, Clone)]
pub struct DocumentDeletion {
    /// Deleted document.
    pub document_id: Uuid,
    /// Posting undone.
    pub reversal: ReversalOutcome,
    /// Items whose stock was restored.
    pub items_restocked: usize,
}

/// Next number that would be issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextNumber {
    /// Prefix.
    pub prefix: String,
    /// Numeric part.
    pub number: i64,
    /// `prefix + number`, padded per kind.
    pub document_number: String,
}

/// Document service.
#[derive(Debug, Clone)]
pub struct DocumentService {
    db: DatabaseConnection,
}

impl DocumentService {
    /// Creates a new document service.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a document, applies its stock movements and posts its settlement.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Lines, amounts or adjustments are invalid
    /// - The party, linked document or an item does not exist
    /// - Outgoing stock is insufficient
    /// - The document number is taken
    pub async fn create(&self, input: CreateDocumentInput) -> Result<DocumentChange, StoreError> {
        let kind = input.kind;
        let org = input.organization_id;
        let (line_amounts, totals, settled) = Self::evaluate(&input)?;
        let settlement = Settlement::evaluate(totals.total, settled);

        let txn = self.db.begin().await?;

        if let Some(party_id) = input.party_id {
            parties::Entity::find_by_id(party_id)
                .filter(parties::Column::OrganizationId.eq(org))
                .one(&txn)
                .await?
                .ok_or(LedgerError::PartyNotFound(party_id))?;
        }
        if let Some(linked_id) = input.linked_document_id {
            Self::find_header(&txn, org, linked_id)
                .await?
                .ok_or(LedgerError::DocumentNotFound(linked_id))?;
        }

        let prefix = resolve_prefix(kind, input.prefix.as_deref());
        let number = match input.number {
            Some(number) if number <= 0 => return Err(LedgerError::NegativeField("number").into()),
            Some(number) => number,
            None => next_number(Self::last_number(&txn, org, kind, &prefix).await?),
        };
        let document_number = format_document_number(kind, &prefix, number);

        if Self::number_taken(&txn, org, kind, &prefix, number).await? {
            return Err(LedgerError::DuplicateDocumentNumber(document_number).into());
        }

        let now = Utc::now().into();
        let header = documents::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(org),
            user_id: Set(input.user_id),
            kind: Set(kind.into()),
            party_id: Set(input.party_id),
            prefix: Set(prefix),
            number: Set(number),
            document_number: Set(document_number.clone()),
            document_date: Set(input.document_date),
            due_date: Set(input.due_date),
            subtotal: Set(totals.subtotal),
            discount_amount: Set(totals.discount),
            tax_amount: Set(totals.tax),
            additional_charges: Set(totals.additional_charges),
            round_off: Set(totals.round_off),
            total_amount: Set(totals.total),
            settled_amount: Set(settled),
            balance_amount: Set(settlement.balance),
            payment_status: Set(settlement.status.into()),
            payment_mode: Set(input.payment_mode.label().to_string()),
            bank_account_id: Set(input.bank_account_id),
            category: Set(input.category.clone()),
            linked_document_id: Set(input.linked_document_id),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let document = header.insert(&txn).await.map_err(|e| {
            on_unique_violation(e, || LedgerError::DuplicateDocumentNumber(document_number.clone()))
        })?;

        let mut lines = Vec::with_capacity(line_amounts.len());
        for (index, (line, amounts)) in input.lines.iter().zip(&line_amounts).enumerate() {
            let line_number = i32::try_from(index + 1)
                .map_err(|_| LedgerError::Internal("too many lines".to_string()))?;
            lines.push(Self::insert_line(&txn, document.id, line_number, line, amounts).await?);
        }

        let movements = plan_movements(
            kind.stock_effect(),
            lines.iter().map(|l| (l.item_id, l.quantity)),
        );
        StockRepository::apply(&txn, org, &movements).await?;

        let request = Self::posting_request(&document, kind, input.user_id);
        let posting = PostingEngine::post(&txn, &request).await?;

        txn.commit().await?;

        info!(
            organization_id = %org,
            document_id = %document.id,
            kind = %kind,
            document_number = %document.document_number,
            total = %document.total_amount,
            settled = %document.settled_amount,
            posted = !posting.is_skipped(),
            "Document created"
        );

        Ok(DocumentChange {
            record: DocumentRecord { document, lines },
            reversal: None,
            posting,
        })
    }

    /// Changes settlement fields: reverses the old posting and posts the new one.
    ///
    /// Lines and quantities are not editable, so stock is untouched. The new
    /// posting is recorded against `user_id`, the user making the edit.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound`, a validation error, or a database error.
    pub async fn update_settlement(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        id: Uuid,
        update: SettlementUpdate,
    ) -> Result<DocumentChange, StoreError> {
        let txn = self.db.begin().await?;

        let current = documents::Entity::find_by_id(id)
            .filter(documents::Column::OrganizationId.eq(organization_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::DocumentNotFound(id))?;
        let kind = DocumentKind::from(current.kind);

        let reversal = ReversalEngine::reverse(&txn, organization_id, id).await?;

        let settled = match update.settled_amount {
            Some(amount) if amount < Decimal::ZERO => {
                return Err(LedgerError::NegativeField("settled_amount").into());
            }
            Some(amount) => round_money(check_money("settled_amount", amount)?),
            None => current.settled_amount,
        };

        let mut active: documents::ActiveModel = current.clone().into();
        let total = if kind.has_lines() {
            current.total_amount
        } else {
            if settled.is_zero() {
                return Err(LedgerError::ZeroAmount.into());
            }
            let totals = DocumentTotals::flat(settled);
            active.subtotal = Set(totals.subtotal);
            active.total_amount = Set(totals.total);
            totals.total
        };
        let settlement = Settlement::evaluate(total, settled);

        active.settled_amount = Set(settled);
        active.balance_amount = Set(settlement.balance);
        active.payment_status = Set(settlement.status.into());
        if let Some(mode) = update.payment_mode {
            active.payment_mode = Set(mode.label().to_string());
        }
        if let Some(bank_account_id) = update.bank_account_id {
            active.bank_account_id = Set(bank_account_id);
        }
        if let Some(notes) = update.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Utc::now().into());
        let document = active.update(&txn).await?;

        let posting =
            PostingEngine::post(&txn, &Self::posting_request(&document, kind, user_id)).await?;
        let lines = Self::find_lines(&txn, id).await?;

        txn.commit().await?;

        info!(
            organization_id = %organization_id,
            document_id = %id,
            kind = %kind,
            settled = %document.settled_amount,
            reversed = reversal.is_reversed(),
            posted = !posting.is_skipped(),
            "Document settlement updated"
        );

        Ok(DocumentChange {
            record: DocumentRecord { document, lines },
            reversal: Some(reversal),
            posting,
        })
    }

    /// Deletes a document, reversing its posting and its stock movements.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound`, `InsufficientStock` when received stock has
    /// already been sold, or a database error.
    pub async fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<DocumentDeletion, StoreError> {
        let txn = self.db.begin().await?;

        let document = documents::Entity::find_by_id(id)
            .filter(documents::Column::OrganizationId.eq(organization_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::DocumentNotFound(id))?;
        let kind = DocumentKind::from(document.kind);

        let reversal = ReversalEngine::reverse(&txn, organization_id, id).await?;

        let lines = Self::find_lines(&txn, id).await?;
        let movements = plan_movements(
            kind.stock_effect().inverse(),
            lines.iter().map(|l| (l.item_id, l.quantity)),
        );
        StockRepository::apply(&txn, organization_id, &movements).await?;

        documents::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        info!(
            organization_id = %organization_id,
            document_id = %id,
            kind = %kind,
            reversed = reversal.is_reversed(),
            "Document deleted"
        );

        Ok(DocumentDeletion {
            document_id: id,
            reversal,
            items_restocked: movements.len(),
        })
    }

    /// Gets a document with its lines.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` or a database error.
    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> Result<DocumentRecord, StoreError> {
        let document = Self::find_header(&self.db, organization_id, id)
            .await?
            .ok_or(LedgerError::DocumentNotFound(id))?;
        let lines = Self::find_lines(&self.db, id).await?;
        Ok(DocumentRecord { document, lines })
    }

    /// Lists documents of one kind, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        kind: DocumentKind,
        page: PageRequest,
    ) -> Result<PageResponse<documents::Model>, DbErr> {
        let page = page.normalized();
        let paginator = documents::Entity::find()
            .filter(documents::Column::OrganizationId.eq(organization_id))
            .filter(documents::Column::Kind.eq(DocumentType::from(kind)))
            .order_by_desc(documents::Column::DocumentDate)
            .order_by_desc(documents::Column::Number)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(u64::from(page.page) - 1).await?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Returns the number the next document of `kind` would get.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn next_number(
        &self,
        organization_id: Uuid,
        kind: DocumentKind,
        prefix: Option<&str>,
    ) -> Result<NextNumber, DbErr> {
        let prefix = resolve_prefix(kind, prefix);
        let last = Self::last_number(&self.db, organization_id, kind, &prefix).await?;
        let number = next_number(last);
        Ok(NextNumber {
            document_number: format_document_number(kind, &prefix, number),
            prefix,
            number,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Totals, per-line amounts and the settled amount for a new document.
    fn evaluate(
        input: &CreateDocumentInput,
    ) -> Result<(Vec<LineAmounts>, DocumentTotals, Decimal), LedgerError> {
        if !input.kind.has_lines() {
            let amount = input.amount.ok_or(LedgerError::MissingField("amount"))?;
            if amount < Decimal::ZERO {
                return Err(LedgerError::NegativeAmount);
            }
            let totals = DocumentTotals::flat(check_money("amount", amount)?);
            if totals.total.is_zero() {
                return Err(LedgerError::ZeroAmount);
            }
            return Ok((Vec::new(), totals, totals.total));
        }

        if input.lines.is_empty() {
            return Err(LedgerError::EmptyDocument);
        }
        if input.settled_amount < Decimal::ZERO {
            return Err(LedgerError::NegativeField("settled_amount"));
        }
        let settled = check_money("settled_amount", input.settled_amount)?;
        let (amounts, totals) = compute_totals(&input.lines, &input.adjustments)?;
        Ok((amounts, totals, round_money(settled)))
    }

    fn posting_request(
        document: &documents::Model,
        kind: DocumentKind,
        user_id: Uuid,
    ) -> PostingRequest {
        let payment_mode = PaymentMode::parse(&document.payment_mode);
        PostingRequest {
            organization_id: document.organization_id,
            user_id,
            description: kind.describe(
                &document.document_number,
                &payment_mode,
                document.category.as_deref(),
            ),
            payment_mode,
            bank_account_id: document.bank_account_id,
            amount: document.settled_amount,
            transaction_date: document.document_date,
            transaction_type: kind.transaction_type(),
            source: Some(SourceRef {
                kind,
                document_id: document.id,
            }),
        }
    }

    async fn insert_line<C: ConnectionTrait>(
        conn: &C,
        document_id: Uuid,
        line_number: i32,
        line: &LineInput,
        amounts: &LineAmounts,
    ) -> Result<document_lines::Model, DbErr> {
        document_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            document_id: Set(document_id),
            line_number: Set(line_number),
            item_id: Set(line.item_id),
            description: Set(line.description.trim().to_string()),
            quantity: Set(line.quantity),
            rate: Set(line.rate),
            discount_percent: Set(line.discount_percent),
            tax_percent: Set(line.tax_percent),
            subtotal: Set(amounts.subtotal),
            discount_amount: Set(amounts.discount),
            tax_amount: Set(amounts.tax),
            amount: Set(amounts.amount),
        }
        .insert(conn)
        .await
    }

    async fn find_header<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<documents::Model>, DbErr> {
        documents::Entity::find_by_id(id)
            .filter(documents::Column::OrganizationId.eq(organization_id))
            .one(conn)
            .await
    }

    async fn find_lines<C: ConnectionTrait>(
        conn: &C,
        document_id: Uuid,
    ) -> Result<Vec<document_lines::Model>, DbErr> {
        document_lines::Entity::find()
            .filter(document_lines::Column::DocumentId.eq(document_id))
            .order_by_asc(document_lines::Column::LineNumber)
            .all(conn)
            .await
    }

    async fn last_number<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        kind: DocumentKind,
        prefix: &str,
    ) -> Result<Option<i64>, DbErr> {
        let max = documents::Entity::find()
            .select_only()
            .column_as(documents::Column::Number.max(), "max_number")
            .filter(documents::Column::OrganizationId.eq(organization_id))
            .filter(documents::Column::Kind.eq(DocumentType::from(kind)))
            .filter(documents::Column::Prefix.eq(prefix))
            .into_tuple::<Option<i64>>()
            .one(conn)
            .await?;
        Ok(max.flatten())
    }

    async fn number_taken<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        kind: DocumentKind,
        prefix: &str,
        number: i64,
    ) -> Result<bool, DbErr> {
        let count = documents::Entity::find()
            .filter(documents::Column::OrganizationId.eq(organization_id))
            .filter(documents::Column::Kind.eq(DocumentType::from(kind)))
            .filter(documents::Column::Prefix.eq(prefix))
            .filter(documents::Column::Number.eq(number))
            .count(conn)
            .await?;
        Ok(count > 0)
    }
}
