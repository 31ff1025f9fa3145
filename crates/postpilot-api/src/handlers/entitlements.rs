use std::sync::Arc;

use axum::{extract::State, Json};
use postpilot_core::EntitlementSummary;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct EntitlementsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub entitlements: EntitlementSummary,
}

/// Caller's tier, limits, current usage and per-metric quota status.
#[utoipa::path(
    get,
    path = "/api/v1/entitlements",
    tag = "entitlements",
    responses(
        (status = 200, description = "Entitlement summary", body = EntitlementsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "get_entitlements"))]
pub async fn get_entitlements(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<Json<EntitlementsResponse>, HttpAppError> {
    let entitlements = state.entitlements.summary(user.user_id).await?;
    Ok(Json(EntitlementsResponse {
        success: true,
        entitlements,
    }))
}
