//! Operator endpoints, authenticated with the master API key.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use postpilot_core::models::User;
use postpilot_core::{PeriodId, PlanTier};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPlanRequest {
    pub tier: PlanTier,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SetPlanResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetUsageResponse {
    pub success: bool,
    #[schema(value_type = String)]
    pub period: PeriodId,
    pub users_reset: u64,
}

/// Change a user's plan (called by the billing webhook).
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/plan",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = SetPlanRequest,
    responses(
        (status = 200, description = "Plan updated", body = SetPlanResponse),
        (status = 400, description = "Invalid user id or tier", body = ErrorResponse),
        (status = 401, description = "Invalid admin key", body = ErrorResponse)
    ),
    security(("master_key" = []))
)]
pub async fn set_user_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SetPlanRequest>,
) -> Result<Json<SetPlanResponse>, HttpAppError> {
    let user_id = Uuid::parse_str(&id).map_err(postpilot_core::AppError::from)?;
    let user = state.users.set_plan_tier(user_id, request.tier).await?;
    tracing::info!(%user_id, tier = %request.tier, "User plan changed");
    Ok(Json(SetPlanResponse {
        success: true,
        user,
    }))
}

/// Zero every user's current-period counters now.
#[utoipa::path(
    post,
    path = "/api/v1/admin/usage/reset",
    tag = "admin",
    responses(
        (status = 200, description = "Usage reset", body = ResetUsageResponse),
        (status = 401, description = "Invalid admin key", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    security(("master_key" = []))
)]
pub async fn reset_usage(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResetUsageResponse>, HttpAppError> {
    let period = PeriodId::current();
    let users_reset = state.usage().reset_usage_in(&period).await?;
    tracing::info!(%period, users_reset, "Manual usage reset completed");
    Ok(Json(ResetUsageResponse {
        success: true,
        period,
        users_reset,
    }))
}
