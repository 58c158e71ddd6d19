//! Transfers between the organization's accounts and to outside bank accounts.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::{NaiveDate, Utc};
use khata_core::ledger::ExternalBeneficiary;
use khata_db::{
    TransferService,
    repositories::{ExternalTransferInput, InternalTransferInput},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{accounts::TransactionResponse, check_membership};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/transfers/internal",
            post(transfer_internal),
        )
        .route(
            "/organizations/{org_id}/transfers/external",
            post(transfer_external),
        )
}

/// Request body for an internal transfer.
#[derive(Debug, Deserialize)]
pub struct InternalTransferRequest {
    /// Source account.
    pub from_account_id: Uuid,
    /// Destination account.
    pub to_account_id: Uuid,
    /// Positive amount.
    pub amount: Decimal,
    /// Business date (default today).
    pub transaction_date: Option<NaiveDate>,
    /// Description.
    pub description: Option<String>,
}

/// Request body for an external transfer.
#[derive(Debug, Deserialize)]
pub struct ExternalTransferRequest {
    /// Source account.
    pub from_account_id: Uuid,
    /// Positive amount.
    pub amount: Decimal,
    /// Business date (default today).
    pub transaction_date: Option<NaiveDate>,
    /// Description.
    pub description: Option<String>,
    /// Beneficiary name.
    #[serde(default)]
    pub account_holder: String,
    /// Beneficiary account number.
    #[serde(default)]
    pub account_number: String,
    /// Beneficiary bank.
    #[serde(default)]
    pub bank_name: String,
    /// Beneficiary IFSC code.
    #[serde(default)]
    pub ifsc_code: String,
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

/// POST `/organizations/{org_id}/transfers/internal`
async fn transfer_internal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<InternalTransferRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let result = TransferService::new((*state.db).clone())
        .transfer_internal(InternalTransferInput {
            organization_id: org_id,
            user_id: auth.user_id(),
            from_account_id: payload.from_account_id,
            to_account_id: payload.to_account_id,
            amount: payload.amount,
            transaction_date: today_or(payload.transaction_date),
            description: payload.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "outgoing": TransactionResponse::from(result.outgoing),
            "incoming": TransactionResponse::from(result.incoming),
            "from_balance": result.from_balance,
            "to_balance": result.to_balance,
        })),
    ))
}

/// POST `/organizations/{org_id}/transfers/external`
async fn transfer_external(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<ExternalTransferRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let result = TransferService::new((*state.db).clone())
        .transfer_external(ExternalTransferInput {
            organization_id: org_id,
            user_id: auth.user_id(),
            from_account_id: payload.from_account_id,
            amount: payload.amount,
            transaction_date: today_or(payload.transaction_date),
            description: payload.description,
            beneficiary: ExternalBeneficiary {
                account_holder: payload.account_holder,
                account_number: payload.account_number,
                bank_name: payload.bank_name,
                ifsc_code: payload.ifsc_code,
            },
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
