//! Feature check endpoints.
//!
//! Each route is wrapped in a feature guard; reaching the handler means the
//! caller's plan includes the feature.

use std::sync::Arc;

use axum::{extract::State, Json};
use postpilot_core::{Feature, PlanTier};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FeatureAccessResponse {
    pub success: bool,
    pub feature: Feature,
    pub tier: PlanTier,
}

async fn granted(
    state: &AppState,
    user: UserContext,
    feature: Feature,
) -> Result<Json<FeatureAccessResponse>, HttpAppError> {
    let tier = state.entitlements.resolve_tier(user.user_id).await?;
    Ok(Json(FeatureAccessResponse {
        success: true,
        feature,
        tier,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/features/brand-voice",
    tag = "features",
    responses(
        (status = 200, description = "Plan includes brand voice", body = FeatureAccessResponse),
        (status = 403, description = "Plan does not include brand voice", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn brand_voice(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<Json<FeatureAccessResponse>, HttpAppError> {
    granted(&state, user, Feature::BrandVoice).await
}

#[utoipa::path(
    get,
    path = "/api/v1/features/content-approval",
    tag = "features",
    responses(
        (status = 200, description = "Plan includes content approval", body = FeatureAccessResponse),
        (status = 403, description = "Plan does not include content approval", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn content_approval(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<Json<FeatureAccessResponse>, HttpAppError> {
    granted(&state, user, Feature::ContentApproval).await
}

#[utoipa::path(
    get,
    path = "/api/v1/features/api-access",
    tag = "features",
    responses(
        (status = 200, description = "Plan includes API access", body = FeatureAccessResponse),
        (status = 403, description = "Plan does not include API access", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn api_access(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<Json<FeatureAccessResponse>, HttpAppError> {
    granted(&state, user, Feature::ApiAccess).await
}
