//! Usage period repository: per-user monthly counters in `usage_periods`.
//!
//! Increments are single `INSERT ... ON CONFLICT DO UPDATE` statements that add
//! a delta to one column, so concurrent writers never overwrite each other.

use async_trait::async_trait;
use postpilot_core::models::{UsageMetric, UsagePeriod};
use postpilot_core::{AppError, PeriodId, UsageStore};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const USAGE_COLUMNS: &str = "user_id, period_id, posts_created, ai_credits_used, \
    image_generations_used, video_generations_used, storage_mb_used";

#[derive(Clone)]
pub struct UsageRepository {
    pool: PgPool,
}

impl UsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a period document without creating it.
    #[tracing::instrument(skip(self), fields(db.table = "usage_periods"))]
    pub async fn find(
        &self,
        user_id: Uuid,
        period: &PeriodId,
    ) -> Result<Option<UsagePeriod>, AppError> {
        let row = sqlx::query_as::<Postgres, UsagePeriod>(&format!(
            "SELECT {} FROM usage_periods WHERE user_id = $1 AND period_id = $2",
            USAGE_COLUMNS
        ))
        .bind(user_id)
        .bind(period.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl UsageStore for UsageRepository {
    #[tracing::instrument(skip(self), fields(db.table = "usage_periods"))]
    async fn get_or_create(
        &self,
        user_id: Uuid,
        period: &PeriodId,
    ) -> Result<UsagePeriod, AppError> {
        sqlx::query(
            r#"
            INSERT INTO usage_periods (user_id, period_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, period_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(period.as_str())
        .execute(&self.pool)
        .await?;

        self.find(user_id, period).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "Usage period {} for user {} missing after create",
                period, user_id
            ))
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "usage_periods"))]
    async fn increment(
        &self,
        user_id: Uuid,
        period: &PeriodId,
        metric: UsageMetric,
        amount: i64,
    ) -> Result<(), AppError> {
        // Column names come from a closed enum, never from input.
        let sql = format!(
            r#"
            INSERT INTO usage_periods (user_id, period_id, {col})
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, period_id) DO UPDATE SET
                {col} = usage_periods.{col} + EXCLUDED.{col},
                updated_at = NOW()
            "#,
            col = metric.column()
        );

        sqlx::query(&sql)
            .bind(user_id)
            .bind(period.as_str())
            .bind(amount)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "usage_periods"))]
    async fn reset(&self, user_id: Uuid, period: &PeriodId) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO usage_periods (user_id, period_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, period_id) DO UPDATE SET
                posts_created = 0,
                ai_credits_used = 0,
                image_generations_used = 0,
                video_generations_used = 0,
                storage_mb_used = 0,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(period.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
