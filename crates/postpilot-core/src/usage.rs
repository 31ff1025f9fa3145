//! Usage tracking service
//!
//! Wraps a [`UsageStore`] with the current-period resolution and the monthly
//! reset sweep. Every call is a single attempt: store errors propagate.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{UsageMetric, UsagePeriod};
use crate::period::PeriodId;
use crate::store::{UsageStore, UserStore};

#[derive(Clone)]
pub struct UsageTracker {
    usage: Arc<dyn UsageStore>,
    users: Arc<dyn UserStore>,
}

impl UsageTracker {
    pub fn new(usage: Arc<dyn UsageStore>, users: Arc<dyn UserStore>) -> Self {
        Self { usage, users }
    }

    /// Current-period usage; creates a zeroed document if none exists yet.
    pub async fn get_usage(&self, user_id: Uuid) -> Result<UsagePeriod, AppError> {
        self.get_usage_in(user_id, &PeriodId::current()).await
    }

    pub async fn get_usage_in(
        &self,
        user_id: Uuid,
        period: &PeriodId,
    ) -> Result<UsagePeriod, AppError> {
        self.usage.get_or_create(user_id, period).await
    }

    /// Record `amount` units of `metric` in the current period.
    pub async fn increment_usage(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
        amount: i64,
    ) -> Result<(), AppError> {
        self.increment_usage_in(user_id, &PeriodId::current(), metric, amount)
            .await
    }

    #[tracing::instrument(skip(self, period), fields(period = %period))]
    pub async fn increment_usage_in(
        &self,
        user_id: Uuid,
        period: &PeriodId,
        metric: UsageMetric,
        amount: i64,
    ) -> Result<(), AppError> {
        if amount < 1 {
            return Err(AppError::InvalidInput(format!(
                "Usage amount must be at least 1, got {}",
                amount
            )));
        }
        self.usage.increment(user_id, period, metric, amount).await?;
        tracing::debug!(%user_id, %metric, amount, "Usage incremented");
        Ok(())
    }

    /// Zero the current-period document of every known user.
    /// Returns the number of users reset.
    pub async fn reset_monthly_usage(&self) -> Result<u64, AppError> {
        self.reset_usage_in(&PeriodId::current()).await
    }

    #[tracing::instrument(skip(self, period), fields(period = %period))]
    pub async fn reset_usage_in(&self, period: &PeriodId) -> Result<u64, AppError> {
        let user_ids = self.users.list_user_ids().await?;
        let mut reset = 0u64;
        for user_id in user_ids {
            self.usage.reset(user_id, period).await?;
            reset += 1;
        }
        tracing::info!(users_reset = reset, "Monthly usage reset completed");
        Ok(reset)
    }
}
