use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::plans::PlanTier;

/// User record as seen by the entitlements core.
///
/// `plan_tier` is owned by billing flows and may be absent, in which case the
/// user is treated as `free`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub plan_tier: Option<PlanTier>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
