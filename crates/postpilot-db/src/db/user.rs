use async_trait::async_trait;
use postpilot_core::models::User;
use postpilot_core::{AppError, PlanTier, UserStore};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[tracing::instrument(skip(self), fields(db.table = "users", db.record_id = %user_id))]
    async fn get_plan_tier(&self, user_id: Uuid) -> Result<Option<PlanTier>, AppError> {
        let tier = sqlx::query_scalar::<Postgres, Option<PlanTier>>(
            "SELECT plan_tier FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tier.flatten())
    }

    #[tracing::instrument(skip(self), fields(db.table = "users"))]
    async fn list_user_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<Postgres, Uuid>("SELECT id FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.record_id = %user_id))]
    async fn set_plan_tier(&self, user_id: Uuid, tier: PlanTier) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (id, plan_tier)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET
                plan_tier = EXCLUDED.plan_tier,
                updated_at = NOW()
            RETURNING id, plan_tier, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(tier)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(%user_id, tier = %tier, "Updated user plan tier");
        Ok(user)
    }
}
