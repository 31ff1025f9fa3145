//! Usage read and record endpoints.
//!
//! Record routes sit behind a quota guard for their metric, so by the time a
//! handler runs the caller was under the limit. The guard and the increment
//! are separate steps: concurrent requests may overshoot a limit slightly.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use postpilot_core::models::{UsageMetric, UsagePeriod};
use postpilot_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::UserContext;
use crate::constants::DEFAULT_USAGE_AMOUNT;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordUsageRequest {
    /// Units to add; defaults to 1
    #[validate(range(min = 1, max = 1_000_000))]
    pub amount: Option<i64>,
}

impl RecordUsageRequest {
    /// Empty bodies are allowed and mean `amount = 1`.
    pub fn parse(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let request: Self = serde_json::from_slice(body)?;
        request.validate()?;
        Ok(request)
    }

    pub fn amount(&self) -> i64 {
        self.amount.unwrap_or(DEFAULT_USAGE_AMOUNT)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsageResponse {
    pub success: bool,
    pub usage: UsagePeriod,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordUsageResponse {
    pub success: bool,
    pub metric: UsageMetric,
    pub amount: i64,
    pub usage: UsagePeriod,
}

/// Current-period usage; creates a zeroed period on first read.
#[utoipa::path(
    get,
    path = "/api/v1/usage",
    tag = "usage",
    responses(
        (status = 200, description = "Current period usage", body = UsageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "get_usage"))]
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<Json<UsageResponse>, HttpAppError> {
    let usage = state.usage().get_usage(user.user_id).await?;
    Ok(Json(UsageResponse {
        success: true,
        usage,
    }))
}

async fn record(
    state: &AppState,
    user: UserContext,
    metric: UsageMetric,
    body: &[u8],
) -> Result<Json<RecordUsageResponse>, HttpAppError> {
    let amount = RecordUsageRequest::parse(body)?.amount();
    state
        .usage()
        .increment_usage(user.user_id, metric, amount)
        .await?;
    let usage = state.usage().get_usage(user.user_id).await?;

    tracing::info!(user_id = %user.user_id, %metric, amount, "Usage recorded");
    Ok(Json(RecordUsageResponse {
        success: true,
        metric,
        amount,
        usage,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/usage/posts",
    tag = "usage",
    request_body(content = RecordUsageRequest, description = "Optional amount"),
    responses(
        (status = 200, description = "Post recorded", body = RecordUsageResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 429, description = "Monthly post quota exhausted", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_post(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    body: Bytes,
) -> Result<Json<RecordUsageResponse>, HttpAppError> {
    record(&state, user, UsageMetric::PostsCreated, &body).await
}

#[utoipa::path(
    post,
    path = "/api/v1/usage/ai-credits",
    tag = "usage",
    request_body(content = RecordUsageRequest, description = "Optional amount"),
    responses(
        (status = 200, description = "AI credits recorded", body = RecordUsageResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 429, description = "Monthly AI credit quota exhausted", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_ai_credits(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    body: Bytes,
) -> Result<Json<RecordUsageResponse>, HttpAppError> {
    record(&state, user, UsageMetric::AiCreditsUsed, &body).await
}

#[utoipa::path(
    post,
    path = "/api/v1/usage/image-generations",
    tag = "usage",
    request_body(content = RecordUsageRequest, description = "Optional amount"),
    responses(
        (status = 200, description = "Image generation recorded", body = RecordUsageResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 429, description = "Image generation quota exhausted", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_image_generation(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    body: Bytes,
) -> Result<Json<RecordUsageResponse>, HttpAppError> {
    record(&state, user, UsageMetric::ImageGenerationsUsed, &body).await
}

#[utoipa::path(
    post,
    path = "/api/v1/usage/video-generations",
    tag = "usage",
    request_body(content = RecordUsageRequest, description = "Optional amount"),
    responses(
        (status = 200, description = "Video generation recorded", body = RecordUsageResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 429, description = "Video generation quota exhausted", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_video_generation(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    body: Bytes,
) -> Result<Json<RecordUsageResponse>, HttpAppError> {
    record(&state, user, UsageMetric::VideoGenerationsUsed, &body).await
}

#[utoipa::path(
    post,
    path = "/api/v1/usage/storage",
    tag = "usage",
    request_body(content = RecordUsageRequest, description = "Megabytes added; optional"),
    responses(
        (status = 200, description = "Storage recorded", body = RecordUsageResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 429, description = "Storage quota exhausted", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_storage(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    body: Bytes,
) -> Result<Json<RecordUsageResponse>, HttpAppError> {
    record(&state, user, UsageMetric::StorageMbUsed, &body).await
}
