//! Plan guards for protected routes.
//!
//! Both guards run after authentication, read the caller from
//! [`UserContext`] and either pass the request through untouched or reject
//! it with the entitlement error. Neither ever records usage; the handler
//! behind the guard does that.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use postpilot_core::models::UsageMetric;
use postpilot_core::{AppError, Feature};

use crate::auth::UserContext;
use crate::error::HttpAppError;
use crate::state::AppState;

/// Guard state for a route that requires a plan feature.
#[derive(Clone)]
pub struct FeatureGuard {
    pub state: Arc<AppState>,
    pub feature: Feature,
}

impl FeatureGuard {
    pub fn new(state: Arc<AppState>, feature: Feature) -> Self {
        Self { state, feature }
    }
}

/// Guard state for a route that consumes a metered quota.
#[derive(Clone)]
pub struct QuotaGuard {
    pub state: Arc<AppState>,
    pub metric: UsageMetric,
}

impl QuotaGuard {
    pub fn new(state: Arc<AppState>, metric: UsageMetric) -> Self {
        Self { state, metric }
    }
}

fn caller(request: &Request) -> Result<UserContext, HttpAppError> {
    request
        .extensions()
        .get::<UserContext>()
        .copied()
        .ok_or_else(|| HttpAppError(AppError::Unauthorized("Missing user context".to_string())))
}

pub async fn feature_guard(
    State(guard): State<FeatureGuard>,
    request: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    let user = caller(&request)?;
    let tier = guard
        .state
        .entitlements
        .require_feature(user.user_id, guard.feature)
        .await?;

    tracing::debug!(user_id = %user.user_id, feature = %guard.feature, %tier, "Feature allowed");
    Ok(next.run(request).await)
}

pub async fn quota_guard(
    State(guard): State<QuotaGuard>,
    request: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    let user = caller(&request)?;
    let check = guard
        .state
        .entitlements
        .require_quota(user.user_id, guard.metric)
        .await?;

    tracing::debug!(
        user_id = %user.user_id,
        metric = %guard.metric,
        current = check.current,
        limit = check.limit,
        "Quota allowed"
    );
    Ok(next.run(request).await)
}
