//! API route definitions.

use axum::{Router, middleware};
use khata_db::OrganizationRepository;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
};

pub mod accounts;
pub mod documents;
pub mod health;
pub mod pos;
pub mod transfers;

/// Creates the API router: public health plus authenticated organization routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(transfers::routes())
        .merge(documents::routes())
        .merge(pos::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Rejects users who are not members of `org_id`.
pub(crate) async fn check_membership(
    state: &AppState,
    org_id: Uuid,
    auth: &AuthUser,
) -> ApiResult<()> {
    let org_repo = OrganizationRepository::new((*state.db).clone());
    if org_repo.is_member(org_id, auth.user_id()).await? {
        Ok(())
    } else {
        Err(ApiError::not_a_member())
    }
}
