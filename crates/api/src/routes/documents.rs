//! Source document routes for every document kind.
//!
//! The kind is the path segment after `documents/` (`sales_invoice`,
//! `payment_out`, ...). Responses carry the posting outcome so a client can
//! tell a document that moved money from one that was saved without posting.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use khata_core::document::{DocumentAdjustments, DocumentKind, LineInput};
use khata_core::ledger::{LedgerError, PaymentMode};
use khata_db::{
    DocumentService,
    repositories::{CreateDocumentInput, DocumentChange, SettlementUpdate},
};
use khata_shared::types::PageRequest;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::check_membership;
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/documents/{kind}",
            get(list_documents).post(create_document),
        )
        .route(
            "/organizations/{org_id}/documents/{kind}/next-number",
            get(next_number),
        )
        .route(
            "/organizations/{org_id}/documents/{kind}/{document_id}",
            get(get_document)
                .patch(update_settlement)
                .delete(delete_document),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a document.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    /// Customer or supplier.
    pub party_id: Option<Uuid>,
    /// Number prefix (kind default when absent).
    pub prefix: Option<String>,
    /// Explicit number (next free number when absent).
    pub number: Option<i64>,
    /// Document date (default today).
    pub document_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Lines; empty for payments.
    #[serde(default)]
    pub lines: Vec<LineInput>,
    /// Document-level discount.
    #[serde(default)]
    pub discount: Decimal,
    /// Additional charges.
    #[serde(default)]
    pub additional_charges: Decimal,
    /// Rounding adjustment.
    #[serde(default)]
    pub round_off: Decimal,
    /// Amount of a payment.
    pub amount: Option<Decimal>,
    /// Amount settled now.
    #[serde(
        default,
        alias = "amount_received",
        alias = "amount_paid",
        alias = "paid_amount"
    )]
    pub settled_amount: Decimal,
    /// Payment mode (default cash).
    #[serde(default)]
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

impl CreateDocumentRequest {
    fn into_input(
        self,
        organization_id: Uuid,
        user_id: Uuid,
        kind: DocumentKind,
    ) -> CreateDocumentInput {
        CreateDocumentInput {
            organization_id,
            user_id,
            kind,
            party_id: self.party_id,
            prefix: self.prefix,
            number: self.number,
            document_date: self.document_date.unwrap_or_else(|| Utc::now().date_naive()),
            due_date: self.due_date,
            lines: self.lines,
            adjustments: DocumentAdjustments {
                discount: self.discount,
                additional_charges: self.additional_charges,
                round_off: self.round_off,
            },
            amount: self.amount,
            settled_amount: self.settled_amount,
            payment_mode: self.payment_mode,
            bank_account_id: self.bank_account_id,
            category: self.category,
            linked_document_id: self.linked_document_id,
            notes: self.notes,
        }
    }
}

/// Request body for changing a document's settlement.
#[derive(Debug, Deserialize)]
pub struct UpdateSettlementRequest {
    /// New settled amount; for payments, the new amount.
    #[serde(
        default,
        alias = "amount",
        alias = "amount_received",
        alias = "amount_paid",
        alias = "paid_amount"
    )]
    pub settled_amount: Option<Decimal>,
    /// New payment mode.
    pub payment_mode: Option<PaymentMode>,
    /// New bank account; `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub bank_account_id: Option<Option<Uuid>>,
    /// New notes; `null` clears them.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub notes: Option<Option<String>>,
}

/// Query parameters for the next number.
#[derive(Debug, Deserialize)]
pub struct NextNumberQuery {
    /// Prefix to number within.
    pub prefix: Option<String>,
}

pub(crate) fn parse_kind(raw: &str) -> Result<DocumentKind, LedgerError> {
    raw.parse()
}

pub(crate) fn change_response(change: DocumentChange) -> Value {
    json!({
        "document": change.record.document,
        "lines": change.record.lines,
        "reversal": change.reversal,
        "posting": change.posting,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/organizations/{org_id}/documents/{kind}`
async fn create_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, kind)): Path<(Uuid, String)>,
    Json(payload): Json<CreateDocumentRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;
    let kind = parse_kind(&kind)?;

    let change = DocumentService::new((*state.db).clone())
        .create(payload.into_input(org_id, auth.user_id(), kind))
        .await?;

    Ok((StatusCode::CREATED, Json(change_response(change))))
}

/// GET `/organizations/{org_id}/documents/{kind}`
async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, kind)): Path<(Uuid, String)>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;
    let kind = parse_kind(&kind)?;

    let documents = DocumentService::new((*state.db).clone())
        .list(org_id, kind, page)
        .await?;
    Ok(Json(documents))
}

/// GET `/organizations/{org_id}/documents/{kind}/next-number`
async fn next_number(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, kind)): Path<(Uuid, String)>,
    Query(query): Query<NextNumberQuery>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;
    let kind = parse_kind(&kind)?;

    let next = DocumentService::new((*state.db).clone())
        .next_number(org_id, kind, query.prefix.as_deref())
        .await?;
    Ok(Json(json!({
        "prefix": next.prefix,
        "number": next.number,
        "document_number": next.document_number,
    })))
}

/// GET `/organizations/{org_id}/documents/{kind}/{document_id}`
async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, kind, document_id)): Path<(Uuid, String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;
    let kind = parse_kind(&kind)?;

    let record = DocumentService::new((*state.db).clone())
        .get(org_id, document_id)
        .await?;
    if DocumentKind::from(record.document.kind) != kind {
        return Err(LedgerError::DocumentNotFound(document_id).into());
    }

    Ok(Json(json!({
        "document": record.document,
        "lines": record.lines,
    })))
}

/// PATCH `/organizations/{org_id}/documents/{kind}/{document_id}`
async fn update_settlement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, kind, document_id)): Path<(Uuid, String, Uuid)>,
    Json(payload): Json<UpdateSettlementRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;
    let kind = parse_kind(&kind)?;

    let service = DocumentService::new((*state.db).clone());
    let existing = service.get(org_id, document_id).await?;
    if DocumentKind::from(existing.document.kind) != kind {
        return Err(LedgerError::DocumentNotFound(document_id).into());
    }

    let change = service
        .update_settlement(
            org_id,
            auth.user_id(),
            document_id,
            SettlementUpdate {
                settled_amount: payload.settled_amount,
                payment_mode: payload.payment_mode,
                bank_account_id: payload.bank_account_id,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(change_response(change)))
}

/// DELETE `/organizations/{org_id}/documents/{kind}/{document_id}`
async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, kind, document_id)): Path<(Uuid, String, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;
    let kind = parse_kind(&kind)?;

    let service = DocumentService::new((*state.db).clone());
    let existing = service.get(org_id, document_id).await?;
    if DocumentKind::from(existing.document.kind) != kind {
        return Err(LedgerError::DocumentNotFound(document_id).into());
    }

    let deletion = service.delete(org_id, document_id).await?;
    Ok(Json(json!({
        "document_id": deletion.document_id,
        "reversal": deletion.reversal,
        "items_restocked": deletion.items_restocked,
    })))
}
