//! Persistence seams for the entitlements core.
//!
//! The core only talks to storage through these traits. Postgres
//! implementations live in `postpilot-db`; in-memory ones are in [`memory`].

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{UsageMetric, UsagePeriod, User};
use crate::period::PeriodId;
use crate::plans::PlanTier;

pub use memory::{InMemoryUsageStore, InMemoryUserStore};

/// Per-user, per-period usage counters.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Read the period document, creating it with all counters at zero if absent.
    async fn get_or_create(&self, user_id: Uuid, period: &PeriodId)
        -> Result<UsagePeriod, AppError>;

    /// Atomically add `amount` to `metric`. When the document is absent it is
    /// created with `metric = amount` and every other counter at zero.
    async fn increment(
        &self,
        user_id: Uuid,
        period: &PeriodId,
        metric: UsageMetric,
        amount: i64,
    ) -> Result<(), AppError>;

    /// Overwrite the period document with all counters at zero.
    async fn reset(&self, user_id: Uuid, period: &PeriodId) -> Result<(), AppError>;

    /// Connectivity check for readiness.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Access to user records (plan tier only).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Plan tier on the user record; `None` if the user or the field is absent.
    async fn get_plan_tier(&self, user_id: Uuid) -> Result<Option<PlanTier>, AppError>;

    /// Every known user id.
    async fn list_user_ids(&self) -> Result<Vec<Uuid>, AppError>;

    /// Set the plan tier, creating the user record if needed.
    async fn set_plan_tier(&self, user_id: Uuid, tier: PlanTier) -> Result<User, AppError>;
}
