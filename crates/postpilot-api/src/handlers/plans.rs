use std::sync::Arc;

use axum::{extract::State, Json};
use postpilot_core::PlanConfig;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Vec<PlanConfig>,
}

/// Public plan catalog, cheapest first.
#[utoipa::path(
    get,
    path = "/api/v1/plans",
    tag = "plans",
    responses(
        (status = 200, description = "All plans", body = PlansResponse)
    )
)]
pub async fn list_plans(State(state): State<Arc<AppState>>) -> Json<PlansResponse> {
    Json(PlansResponse {
        success: true,
        plans: state.catalog().plans().cloned().collect(),
    })
}
