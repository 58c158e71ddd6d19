//! Point-of-sale bills.
//!
//! A bill is a `pos_sale` document numbered `POS-000001`, `POS-000002`, ...
//! Every line names an item, so stock always moves.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use khata_core::document::{DocumentAdjustments, DocumentKind, LineInput};
use khata_core::ledger::{LedgerError, PaymentMode};
use khata_db::{DocumentService, repositories::CreateDocumentInput};
use khata_shared::types::PageRequest;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{check_membership, documents::change_response};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the POS routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/pos/bills",
            post(save_bill).get(list_bills),
        )
}

/// One scanned item.
#[derive(Debug, Deserialize)]
pub struct BillItem {
    /// Item sold.
    pub item_id: Uuid,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit selling price.
    pub selling_price: Decimal,
    /// GST rate in percent.
    #[serde(default)]
    pub gst_rate: Decimal,
}

/// Request body for saving a bill.
#[derive(Debug, Deserialize)]
pub struct SaveBillRequest {
    /// Items on the bill.
    pub items: Vec<BillItem>,
    /// Flat discount.
    #[serde(default)]
    pub discount: Decimal,
    /// Additional charge.
    #[serde(default)]
    pub additional_charge: Decimal,
    /// Cash, card, UPI, cheque...
    #[serde(default, alias = "payment_method")]
    pub payment_mode: PaymentMode,
    /// Bank account for non-cash payments.
    pub bank_account_id: Option<Uuid>,
    /// Amount taken at the counter.
    pub received_amount: Decimal,
    /// Customer, for non-walk-in sales.
    pub customer_id: Option<Uuid>,
}

impl SaveBillRequest {
    fn into_input(
        self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<CreateDocumentInput, LedgerError> {
        if self.items.is_empty() {
            return Err(LedgerError::EmptyDocument);
        }
        let lines = self
            .items
            .into_iter()
            .map(|item| LineInput {
                item_id: Some(item.item_id),
                description: String::new(),
                quantity: item.quantity,
                rate: item.selling_price,
                discount_percent: Decimal::ZERO,
                tax_percent: item.gst_rate,
            })
            .collect();

        Ok(CreateDocumentInput {
            organization_id,
            user_id,
            kind: DocumentKind::PosSale,
            party_id: self.customer_id,
            prefix: None,
            number: None,
            document_date: Utc::now().date_naive(),
            due_date: None,
            lines,
            adjustments: DocumentAdjustments {
                discount: self.discount,
                additional_charges: self.additional_charge,
                round_off: Decimal::ZERO,
            },
            amount: None,
            settled_amount: self.received_amount,
            payment_mode: self.payment_mode,
            bank_account_id: self.bank_account_id,
            category: None,
            linked_document_id: None,
            notes: None,
        })
    }
}

/// POST `/organizations/{org_id}/pos/bills`
async fn save_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<SaveBillRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let input = payload.into_input(org_id, auth.user_id())?;
    let change = DocumentService::new((*state.db).clone())
        .create(input)
        .await?;

    Ok((StatusCode::CREATED, Json(change_response(change))))
}

/// GET `/organizations/{org_id}/pos/bills`
async fn list_bills(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    check_membership(&state, org_id, &auth).await?;

    let bills = DocumentService::new((*state.db).clone())
        .list(org_id, DocumentKind::PosSale, page)
        .await?;
    Ok(Json(bills))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_bill_maps_to_pos_sale() {
        let req: SaveBillRequest = serde_json::from_value(json!({
            "items": [
                {
                    "item_id": Uuid::nil(),
                    "quantity": "2",
                    "selling_price": "45.00",
                    "gst_rate": "5"
                }
            ],
            "payment_method": "UPI",
            "received_amount": "94.50",
        }))
        .unwrap();

        let input = req.into_input(Uuid::nil(), Uuid::nil()).unwrap();
        assert_eq!(input.kind, DocumentKind::PosSale);
        assert_eq!(input.lines.len(), 1);
        assert_eq!(input.lines[0].tax_percent, dec!(5));
        assert_eq!(input.settled_amount, dec!(94.50));
        assert!(!input.payment_mode.is_cash());
    }

    #[test]
    fn test_empty_bill_is_rejected() {
        let req = SaveBillRequest {
            items: Vec::new(),
            discount: Decimal::ZERO,
            additional_charge: Decimal::ZERO,
            payment_mode: PaymentMode::Cash,
            bank_account_id: None,
            received_amount: Decimal::ZERO,
            customer_id: None,
        };
        assert!(matches!(
            req.into_input(Uuid::nil(), Uuid::nil()),
            Err(LedgerError::EmptyDocument)
        ));
    }
}
