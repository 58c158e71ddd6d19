//! Error rendering for handlers.
//!
//! Every failure becomes an [`AppError`] and is rendered as
//! `{"error": <code>, "message": <text>}` with the matching status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use khata_core::ledger::LedgerError;
use khata_db::StoreError;
use khata_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::{error, warn};

/// Handler error that renders as JSON.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 403 for a user outside the organization.
    #[must_use]
    pub fn not_a_member() -> Self {
        Self(AppError::Forbidden(
            "You are not a member of this organization".to_string(),
        ))
    }

    /// 400 with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err.into())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.public_message(),
            })),
        )
            .into_response()
    }
}
