//! Bank and cash account routes, per-account transaction listing and manual
//! adjustments.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use khata_core::ledger::{AccountKind, TransactionType, mask_account_number};
use khata_db::{
    AccountRepository, LedgerRepository, TransferService,
    entities::{accounts, ledger_transactions, sea_orm_active_enums::AccountType},
    repositories::{AdjustmentInput, BankDetails, CreateAccountInput, UpdateAccountInput},
};
use khata_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::check_membership;
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the account routes (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/accounts",
            get(list_accounts).post(create_account),
        )
        .route(
            "/organizations/{org_id}/accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route(
            "/organizations/{org_id}/accounts/{account_id}/reconcile",
            get(reconcile_account),
        )
        .route(
            "/organizations/{org_id}/accounts/{account_id}/transactions",
            get(list_transactions),
        )
        .route(
            "/organizations/{org_id}/accounts/{account_id}/adjustments",
            post(adjust_balance),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// `bank` or `cash`.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
}

/// Bank metadata as sent by clients.
#[derive(Debug, Default, Deserialize)]
pub struct BankDetailsRequest {
    /// Account number.
    pub bank_account_no: Option<String>,
    /// IFSC code.
    pub ifsc_code: Option<String>,
    /// Account holder name.
    pub account_holder_name: Option<String>,
    /// UPI id.
    pub upi_id: Option<String>,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Branch name.
    pub branch_name: Option<String>,
}

impl From<BankDetailsRequest> for BankDetails {
    fn from(req: BankDetailsRequest) -> Self {
        Self {
            bank_account_no: req.bank_account_no,
            ifsc_code: req.ifsc_code,
            account_holder_name: req.account_holder_name,
            upi_id: req.upi_id,
            bank_name: req.bank_name,
            branch_name: req.branch_name,
        }
    }
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Display name.
    pub account_name: String,
    /// `bank` or `cash`.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Opening balance (default 0).
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Date of the opening balance (default today).
    pub as_of_date: Option<NaiveDate>,
    /// Bank metadata.
    #[serde(flatten)]
    pub bank: BankDetailsRequest,
}

/// Request body for updating account metadata.
///
/// There is deliberately no balance field.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// New display name.
    pub account_name: Option<String>,
    /// New as-of date.
    pub as_of_date: Option<NaiveDate>,
    /// Bank metadata to replace.
    #[serde(flatten)]
    pub bank: BankDetailsRequest,
}

/// Request body for a manual adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    /// `add` or `reduce`.
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Business date (default today).
    pub transaction_date: Option<NaiveDate>,
    /// Description.
    pub description: Option<String>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Display name.
    pub account_name: String,
    /// `bank` or `cash`.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Running balance.
    pub current_balance: Decimal,
    /// Date of the opening balance.
    pub as_of_date: NaiveDate,
    /// Account number.
    pub bank_account_no: Option<String>,
    /// IFSC code.
    pub ifsc_code: Option<String>,
    /// Account holder name.
    pub account_holder_name: Option<String>,
    /// UPI id.
    pub upi_id: Option<String>,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Branch name.
    pub branch_name: Option<String>,
}

impl From<accounts::Model> for AccountResponse {
    fn from(a: accounts::Model) -> Self {
        Self {
            id: a.id,
            account_name: a.account_name,
            account_type: a.account_type,
            opening_balance: a.opening_balance,
            current_balance: a.current_balance,
            as_of_date: a.as_of_date,
            bank_account_no: a.bank_account_no,
            ifsc_code: a.ifsc_code,
            account_holder_name: a.account_holder_name,
            upi_id: a.upi_id,
            bank_name: a.bank_name,
            branch_name: a.branch_name,
        }
    }
}

/// Beneficiary of an external transfer, with the account number masked.
#[derive(Debug, Serialize)]
pub struct ExternalAccountResponse {
    /// Account holder.
    pub account_holder: Option<String>,
    /// Account number, all but the last four characters masked.
    pub account_number: Option<String>,
    /// Bank name.
    pub bank_name: Option<String>,
    /// IFSC code.
    pub ifsc_code: Option<String>,
}

/// Response for a ledger transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Account whose balance changed.
    pub account_id: Uuid,
    /// Transaction type.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Balance delta implied by the type.
    pub signed_amount: Decimal,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Kind of the source document.
    pub source_kind: Option<String>,
    /// Source document.
    pub source_document_id: Option<Uuid>,
    /// Counterpart account of a transfer.
    pub related_account_id: Option<Uuid>,
    /// Counterpart row of a transfer.
    pub related_transaction_id: Option<Uuid>,
    /// Beneficiary of an external transfer.
    pub external: Option<ExternalAccountResponse>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<ledger_transactions::Model> for TransactionResponse {
    fn from(t: ledger_transactions::Model) -> Self {
        let transaction_type = TransactionType::from(t.transaction_type);
        let external = t.is_external_transfer.then(|| ExternalAccountResponse {
            account_holder: t.external_account_holder,
            account_number: t.external_account_number.as_deref().map(mask_account_number),
            bank_name: t.external_bank_name,
            ifsc_code: t.external_ifsc_code,
        });
        Self {
            id: t.id,
            account_id: t.account_id,
            transaction_type,
            amount: t.amount,
            signed_amount: transaction_type.signed_amount(t.amount),
            transaction_date: t.transaction_date,
            description: t.description,
            source_kind: t
                .source_kind
                .map(|k| khata_core::document::DocumentKind::from(k).to_string()),
            source_document_id: t.source_document_id,
            related_account_id: t.related_account_id,
            related_transaction_id: t.related_transaction_id,
            external,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/organizations/{org_id}/accounts` - List accounts.
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListAccountsQuery>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let kind = query
        .account_type
        .as_deref()
        .map(str::parse::<AccountKind>)
        .transpose()?;

    let repo = AccountRepository::new((*state.db).clone());
    let accounts: Vec<AccountResponse> = repo
        .list(org_id, kind)
        .await?
        .into_iter()
        .map(AccountResponse::from)
        .collect();

    Ok(Json(json!({ "accounts": accounts })))
}

/// POST `/organizations/{org_id}/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let kind: AccountKind = payload.account_type.parse()?;
    let repo = AccountRepository::new((*state.db).clone());
    let account = repo
        .create(CreateAccountInput {
            organization_id: org_id,
            user_id: auth.user_id(),
            account_name: payload.account_name,
            kind,
            opening_balance: payload.opening_balance,
            as_of_date: payload.as_of_date,
            bank: payload.bank.into(),
        })
        .await?;

    info!(
        org_id = %org_id,
        account_id = %account.id,
        role = auth.role(),
        "Account created via API"
    );

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// GET `/organizations/{org_id}/accounts/{account_id}` - Get an account.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, account_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let account = AccountRepository::new((*state.db).clone())
        .get(org_id, account_id)
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

/// PUT `/organizations/{org_id}/accounts/{account_id}` - Update metadata.
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let account = AccountRepository::new((*state.db).clone())
        .update_metadata(
            org_id,
            account_id,
            UpdateAccountInput {
                account_name: payload.account_name,
                as_of_date: payload.as_of_date,
                bank: payload.bank.into(),
            },
        )
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

/// DELETE `/organizations/{org_id}/accounts/{account_id}` - Delete an unused account.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, account_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    AccountRepository::new((*state.db).clone())
        .delete(org_id, account_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/organizations/{org_id}/accounts/{account_id}/reconcile` - Check the
/// stored balance against the replayed log.
async fn reconcile_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, account_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let rec = AccountRepository::new((*state.db).clone())
        .reconcile(org_id, account_id)
        .await?;
    let consistent = rec.is_consistent();
    Ok(Json(json!({ "reconciliation": rec, "consistent": consistent })))
}

/// GET `/organizations/{org_id}/accounts/{account_id}/transactions` - Newest first.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, account_id)): Path<(Uuid, Uuid)>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let result = LedgerRepository::new((*state.db).clone())
        .list_for_account(org_id, account_id, page)
        .await?;

    Ok(Json(PageResponse {
        data: result
            .data
            .into_iter()
            .map(TransactionResponse::from)
            .collect::<Vec<_>>(),
        meta: result.meta,
    }))
}

/// POST `/organizations/{org_id}/accounts/{account_id}/adjustments` - Add or
/// reduce money.
async fn adjust_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AdjustmentRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let transaction_type: TransactionType = payload.transaction_type.parse()?;
    let result = TransferService::new((*state.db).clone())
        .adjust(AdjustmentInput {
            organization_id: org_id,
            user_id: auth.user_id(),
            account_id,
            transaction_type,
            amount: payload.amount,
            transaction_date: payload
                .transaction_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            description: payload.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "transaction": TransactionResponse::from(result.transaction),
            "new_balance": result.new_balance,
        })),
    ))
}
