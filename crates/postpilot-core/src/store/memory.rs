//! In-memory stores used by tests and by the `memory` store backend.
//!
//! Each store keeps its map behind a single `tokio::sync::Mutex`; every
//! operation completes under the lock, so increments never lose updates.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{UsageStore, UserStore};
use crate::error::AppError;
use crate::models::{UsageMetric, UsagePeriod, User};
use crate::period::PeriodId;
use crate::plans::PlanTier;

#[derive(Clone, Default)]
pub struct InMemoryUsageStore {
    inner: Arc<Mutex<HashMap<(Uuid, PeriodId), UsagePeriod>>>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a document without the create-on-read side effect.
    pub async fn peek(&self, user_id: Uuid, period: &PeriodId) -> Option<UsagePeriod> {
        let guard = self.inner.lock().await;
        guard.get(&(user_id, period.clone())).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn get_or_create(
        &self,
        user_id: Uuid,
        period: &PeriodId,
    ) -> Result<UsagePeriod, AppError> {
        let mut guard = self.inner.lock().await;
        let doc = guard
            .entry((user_id, period.clone()))
            .or_insert_with(|| UsagePeriod::zeroed(user_id, period.clone()));
        Ok(doc.clone())
    }

    async fn increment(
        &self,
        user_id: Uuid,
        period: &PeriodId,
        metric: UsageMetric,
        amount: i64,
    ) -> Result<(), AppError> {
        let mut guard = self.inner.lock().await;
        let doc = guard
            .entry((user_id, period.clone()))
            .or_insert_with(|| UsagePeriod::zeroed(user_id, period.clone()));
        let counter = doc.counter_mut(metric);
        let current = *counter;
        *counter = current.checked_add(amount).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "{} counter would overflow: {} + {}",
                metric, current, amount
            ))
        })?;
        Ok(())
    }

    async fn reset(&self, user_id: Uuid, period: &PeriodId) -> Result<(), AppError> {
        let mut guard = self.inner.lock().await;
        guard.insert(
            (user_id, period.clone()),
            UsagePeriod::zeroed(user_id, period.clone()),
        );
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    inner: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user record, optionally without a plan tier.
    pub async fn insert_user(&self, user_id: Uuid, tier: Option<PlanTier>) -> User {
        let now = Utc::now();
        let user = User {
            id: user_id,
            plan_tier: tier,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.insert(user_id, user.clone());
        user
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_plan_tier(&self, user_id: Uuid) -> Result<Option<PlanTier>, AppError> {
        let guard = self.inner.lock().await;
        Ok(guard.get(&user_id).and_then(|u| u.plan_tier))
    }

    async fn list_user_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let guard = self.inner.lock().await;
        let mut ids: Vec<Uuid> = guard.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    async fn set_plan_tier(&self, user_id: Uuid, tier: PlanTier) -> Result<User, AppError> {
        let mut guard = self.inner.lock().await;
        let now = Utc::now();
        let user = guard.entry(user_id).or_insert_with(|| User {
            id: user_id,
            plan_tier: None,
            created_at: now,
            updated_at: now,
        });
        user.plan_tier = Some(tier);
        user.updated_at = now;
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> PeriodId {
        "2026-10".parse().unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_writes_zeroed_document() {
        let store = InMemoryUsageStore::new();
        let user = Uuid::new_v4();
        assert!(store.peek(user, &period()).await.is_none());

        let doc = store.get_or_create(user, &period()).await.unwrap();
        assert_eq!(doc, UsagePeriod::zeroed(user, period()));
        assert!(store.peek(user, &period()).await.is_some());
    }

    #[tokio::test]
    async fn test_first_increment_sets_only_that_metric() {
        let store = InMemoryUsageStore::new();
        let user = Uuid::new_v4();
        store
            .increment(user, &period(), UsageMetric::AiCreditsUsed, 7)
            .await
            .unwrap();

        let doc = store.peek(user, &period()).await.unwrap();
        assert_eq!(doc.ai_credits_used, 7);
        assert_eq!(doc.posts_created, 0);
        assert_eq!(doc.storage_mb_used, 0);
    }

    #[tokio::test]
    async fn test_concurrent_increments_do_not_lose_updates() {
        let store = InMemoryUsageStore::new();
        let user = Uuid::new_v4();
        store.get_or_create(user, &period()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            let metric = if i % 2 == 0 {
                UsageMetric::PostsCreated
            } else {
                UsageMetric::ImageGenerationsUsed
            };
            handles.push(tokio::spawn(async move {
                store.increment(user, &period(), metric, 1).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let doc = store.peek(user, &period()).await.unwrap();
        assert_eq!(doc.posts_created, 25);
        assert_eq!(doc.image_generations_used, 25);
    }

    #[tokio::test]
    async fn test_overflowing_increment_rejected_and_counter_kept() {
        let store = InMemoryUsageStore::new();
        let user = Uuid::new_v4();
        store
            .increment(user, &period(), UsageMetric::StorageMbUsed, i64::MAX)
            .await
            .unwrap();

        let err = store
            .increment(user, &period(), UsageMetric::StorageMbUsed, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "{:?}", err);

        let doc = store.peek(user, &period()).await.unwrap();
        assert_eq!(doc.storage_mb_used, i64::MAX);
    }

    #[tokio::test]
    async fn test_reset_overwrites_counters() {
        let store = InMemoryUsageStore::new();
        let user = Uuid::new_v4();
        store
            .increment(user, &period(), UsageMetric::PostsCreated, 9)
            .await
            .unwrap();
        store.reset(user, &period()).await.unwrap();
        assert_eq!(
            store.peek(user, &period()).await.unwrap(),
            UsagePeriod::zeroed(user, period())
        );
    }

    #[tokio::test]
    async fn test_user_store_tier_lookup() {
        let users = InMemoryUserStore::new();
        let with_tier = Uuid::new_v4();
        let without_tier = Uuid::new_v4();
        users.insert_user(with_tier, Some(PlanTier::Business)).await;
        users.insert_user(without_tier, None).await;

        assert_eq!(
            users.get_plan_tier(with_tier).await.unwrap(),
            Some(PlanTier::Business)
        );
        assert_eq!(users.get_plan_tier(without_tier).await.unwrap(), None);
        assert_eq!(users.get_plan_tier(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(users.list_user_ids().await.unwrap().len(), 2);

        let updated = users
            .set_plan_tier(without_tier, PlanTier::Agency)
            .await
            .unwrap();
        assert_eq!(updated.plan_tier, Some(PlanTier::Agency));
    }
}
