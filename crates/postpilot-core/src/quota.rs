//! Quota evaluator and feature gate
//!
//! Resolves a caller's plan tier and compares it against the plan catalog.
//! Nothing here writes to the store except the create-on-read of
//! [`UsageTracker::get_usage`].

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{UsageMetric, UsagePeriod};
use crate::period::PeriodId;
use crate::plans::{Feature, PlanCatalog, PlanLimits, PlanTier, UNLIMITED};
use crate::store::UserStore;
use crate::usage::UsageTracker;

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LimitCheck {
    pub allowed: bool,
    pub current: i64,
    pub limit: i64,
}

impl LimitCheck {
    /// Unlimited metrics report `current = 0` without reading usage.
    pub const UNLIMITED: LimitCheck = LimitCheck {
        allowed: true,
        current: 0,
        limit: UNLIMITED,
    };

    /// `current == limit` already blocks.
    pub fn evaluate(current: i64, limit: i64) -> Self {
        if limit == UNLIMITED {
            return Self::UNLIMITED;
        }
        Self {
            allowed: current < limit,
            current,
            limit,
        }
    }
}

/// Outcome of a feature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FeatureCheck {
    pub tier: PlanTier,
    pub feature: Feature,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricStatus {
    pub metric: UsageMetric,
    #[serde(flatten)]
    pub check: LimitCheck,
}

/// Everything the dashboard shows about a caller's plan.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSummary {
    pub tier: PlanTier,
    #[schema(value_type = String)]
    pub period: PeriodId,
    pub limits: PlanLimits,
    pub usage: UsagePeriod,
    pub quotas: Vec<MetricStatus>,
}

#[derive(Clone)]
pub struct EntitlementService {
    catalog: Arc<PlanCatalog>,
    users: Arc<dyn UserStore>,
    usage: UsageTracker,
}

impl EntitlementService {
    pub fn new(catalog: Arc<PlanCatalog>, users: Arc<dyn UserStore>, usage: UsageTracker) -> Self {
        Self {
            catalog,
            users,
            usage,
        }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Caller's tier; a missing user or missing tier counts as `free`.
    pub async fn resolve_tier(&self, user_id: Uuid) -> Result<PlanTier, AppError> {
        Ok(self.users.get_plan_tier(user_id).await?.unwrap_or_default())
    }

    pub async fn check_feature(
        &self,
        user_id: Uuid,
        feature: Feature,
    ) -> Result<FeatureCheck, AppError> {
        let tier = self.resolve_tier(user_id).await?;
        let enabled = self.catalog.get_plan_limits(tier).has_feature(feature);
        Ok(FeatureCheck {
            tier,
            feature,
            enabled,
        })
    }

    pub async fn check_limit(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
    ) -> Result<LimitCheck, AppError> {
        let tier = self.resolve_tier(user_id).await?;
        let limit = self.catalog.get_plan_limits(tier).limit_for(metric);
        if limit == UNLIMITED {
            return Ok(LimitCheck::UNLIMITED);
        }
        let usage = self.usage.get_usage(user_id).await?;
        Ok(LimitCheck::evaluate(usage.get(metric), limit))
    }

    /// Like [`check_feature`](Self::check_feature) but denial is an error.
    pub async fn require_feature(
        &self,
        user_id: Uuid,
        feature: Feature,
    ) -> Result<PlanTier, AppError> {
        let check = self.check_feature(user_id, feature).await?;
        if !check.enabled {
            return Err(AppError::FeatureNotAvailable {
                tier: check.tier,
                feature,
            });
        }
        Ok(check.tier)
    }

    /// Like [`check_limit`](Self::check_limit) but denial is an error.
    pub async fn require_quota(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
    ) -> Result<LimitCheck, AppError> {
        let check = self.check_limit(user_id, metric).await?;
        if !check.allowed {
            return Err(AppError::QuotaExceeded {
                metric,
                current: check.current,
                limit: check.limit,
            });
        }
        Ok(check)
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<EntitlementSummary, AppError> {
        let tier = self.resolve_tier(user_id).await?;
        let limits = self.catalog.get_plan_limits(tier).clone();
        let usage = self.usage.get_usage(user_id).await?;
        let quotas = UsageMetric::ALL
            .into_iter()
            .map(|metric| MetricStatus {
                metric,
                check: LimitCheck::evaluate(usage.get(metric), limits.limit_for(metric)),
            })
            .collect();

        Ok(EntitlementSummary {
            tier,
            period: usage.period_id.clone(),
            limits,
            usage,
            quotas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryUsageStore, InMemoryUserStore};

    struct Fixture {
        service: EntitlementService,
        usage: InMemoryUsageStore,
        users: InMemoryUserStore,
    }

    fn fixture() -> Fixture {
        let usage = InMemoryUsageStore::new();
        let users = InMemoryUserStore::new();
        let tracker = UsageTracker::new(Arc::new(usage.clone()), Arc::new(users.clone()));
        let service = EntitlementService::new(
            Arc::new(PlanCatalog::default()),
            Arc::new(users.clone()),
            tracker,
        );
        Fixture {
            service,
            usage,
            users,
        }
    }

    async fn record(f: &Fixture, user: Uuid, metric: UsageMetric, amount: i64) {
        f.service
            .usage()
            .increment_usage(user, metric, amount)
            .await
            .unwrap();
    }

    #[test]
    fn test_evaluate_boundary() {
        assert!(LimitCheck::evaluate(9, 10).allowed);
        assert!(!LimitCheck::evaluate(10, 10).allowed);
        assert!(!LimitCheck::evaluate(11, 10).allowed);
        assert!(!LimitCheck::evaluate(0, 0).allowed);
        assert_eq!(LimitCheck::evaluate(500, UNLIMITED), LimitCheck::UNLIMITED);
    }

    #[tokio::test]
    async fn test_unlimited_metric_skips_usage_read() {
        let f = fixture();
        let user = Uuid::new_v4();
        f.users.insert_user(user, Some(PlanTier::Creator)).await;

        let check = f
            .service
            .check_limit(user, UsageMetric::PostsCreated)
            .await
            .unwrap();
        assert_eq!(check, LimitCheck::UNLIMITED);
        // No create-on-read happened.
        assert!(f.usage.is_empty().await);
    }

    #[tokio::test]
    async fn test_unlimited_reports_zero_regardless_of_usage() {
        let f = fixture();
        let user = Uuid::new_v4();
        f.users.insert_user(user, Some(PlanTier::Agency)).await;
        record(&f, user, UsageMetric::AiCreditsUsed, 10_000).await;

        let check = f
            .service
            .check_limit(user, UsageMetric::AiCreditsUsed)
            .await
            .unwrap();
        assert_eq!(check, LimitCheck::UNLIMITED);
    }

    #[tokio::test]
    async fn test_free_posts_block_at_limit() {
        let f = fixture();
        let user = Uuid::new_v4();
        f.users.insert_user(user, Some(PlanTier::Free)).await;

        record(&f, user, UsageMetric::PostsCreated, 9).await;
        let check = f
            .service
            .check_limit(user, UsageMetric::PostsCreated)
            .await
            .unwrap();
        assert_eq!(
            check,
            LimitCheck {
                allowed: true,
                current: 9,
                limit: 10
            }
        );

        record(&f, user, UsageMetric::PostsCreated, 1).await;
        let err = f
            .service
            .require_quota(user, UsageMetric::PostsCreated)
            .await
            .unwrap_err();
        match err {
            AppError::QuotaExceeded {
                metric,
                current,
                limit,
            } => {
                assert_eq!(metric, UsageMetric::PostsCreated);
                assert_eq!(current, 10);
                assert_eq!(limit, 10);
            }
            other => panic!("Expected QuotaExceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_tier_behaves_as_free() {
        let f = fixture();
        let no_tier = Uuid::new_v4();
        let unknown_user = Uuid::new_v4();
        f.users.insert_user(no_tier, None).await;

        for user in [no_tier, unknown_user] {
            assert_eq!(f.service.resolve_tier(user).await.unwrap(), PlanTier::Free);
            let feature = f
                .service
                .check_feature(user, Feature::BrandVoice)
                .await
                .unwrap();
            assert!(!feature.enabled);
            let check = f
                .service
                .check_limit(user, UsageMetric::PostsCreated)
                .await
                .unwrap();
            assert_eq!(check.limit, 10);
        }
    }

    #[tokio::test]
    async fn test_zero_limit_blocks_immediately() {
        let f = fixture();
        let user = Uuid::new_v4();
        let check = f
            .service
            .check_limit(user, UsageMetric::VideoGenerationsUsed)
            .await
            .unwrap();
        assert!(!check.allowed);
        assert_eq!(check.limit, 0);
    }

    #[tokio::test]
    async fn test_require_feature() {
        let f = fixture();
        let user = Uuid::new_v4();
        f.users.insert_user(user, Some(PlanTier::Business)).await;

        assert_eq!(
            f.service
                .require_feature(user, Feature::ContentApproval)
                .await
                .unwrap(),
            PlanTier::Business
        );
        let err = f
            .service
            .require_feature(user, Feature::ApiAccess)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::FeatureNotAvailable {
                tier: PlanTier::Business,
                feature: Feature::ApiAccess
            }
        ));
    }

    #[tokio::test]
    async fn test_summary_lists_every_metric() {
        let f = fixture();
        let user = Uuid::new_v4();
        f.users.insert_user(user, Some(PlanTier::Creator)).await;
        record(&f, user, UsageMetric::ImageGenerationsUsed, 50).await;

        let summary = f.service.summary(user).await.unwrap();
        assert_eq!(summary.tier, PlanTier::Creator);
        assert_eq!(summary.quotas.len(), UsageMetric::ALL.len());

        let images = summary
            .quotas
            .iter()
            .find(|q| q.metric == UsageMetric::ImageGenerationsUsed)
            .unwrap();
        assert_eq!(
            images.check,
            LimitCheck {
                allowed: false,
                current: 50,
                limit: 50
            }
        );
        let posts = summary
            .quotas
            .iter()
            .find(|q| q.metric == UsageMetric::PostsCreated)
            .unwrap();
        assert_eq!(posts.check, LimitCheck::UNLIMITED);
    }
}
