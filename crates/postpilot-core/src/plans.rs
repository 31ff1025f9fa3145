//! Plan catalog
//!
//! Static table of subscription tiers and the entitlements each one carries.
//! The catalog is built once at startup (with billing price ids from config)
//! and shared read-only for the lifetime of the process.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::models::UsageMetric;

/// Numeric limit value meaning "no limit".
pub const UNLIMITED: i64 = -1;

/// Subscription tier
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "plan_tier", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Creator,
    Business,
    Agency,
}

impl PlanTier {
    /// All tiers in documented (ascending price) order.
    pub const ALL: [PlanTier; 4] = [
        PlanTier::Free,
        PlanTier::Creator,
        PlanTier::Business,
        PlanTier::Agency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Creator => "creator",
            PlanTier::Business => "business",
            PlanTier::Agency => "agency",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "creator" => Ok(PlanTier::Creator),
            "business" => Ok(PlanTier::Business),
            "agency" => Ok(PlanTier::Agency),
            other => Err(AppError::InvalidInput(format!(
                "Unknown plan tier: {}",
                other
            ))),
        }
    }
}

/// Boolean capabilities a plan may include.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    BrandVoice,
    ContentApproval,
    ApiAccess,
}

impl Feature {
    pub const ALL: [Feature; 3] = [
        Feature::BrandVoice,
        Feature::ContentApproval,
        Feature::ApiAccess,
    ];

    /// Name of the `PlanLimits` field this feature reads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::BrandVoice => "brandVoice",
            Feature::ContentApproval => "contentApproval",
            Feature::ApiAccess => "apiAccess",
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Entitlements of a plan. Any numeric field set to [`UNLIMITED`] has no cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub social_accounts: i64,
    pub posts_per_month: i64,
    pub ai_credits_per_month: i64,
    pub image_generations: i64,
    pub video_generations: i64,
    pub team_members: i64,
    #[serde(rename = "storageMB")]
    pub storage_mb: i64,
    pub analytics_retention_days: i64,
    pub brand_voice: bool,
    pub content_approval: bool,
    pub api_access: bool,
}

impl PlanLimits {
    /// Limit field a usage metric is checked against.
    pub fn limit_for(&self, metric: UsageMetric) -> i64 {
        match metric {
            UsageMetric::PostsCreated => self.posts_per_month,
            UsageMetric::AiCreditsUsed => self.ai_credits_per_month,
            UsageMetric::ImageGenerationsUsed => self.image_generations,
            UsageMetric::VideoGenerationsUsed => self.video_generations,
            UsageMetric::StorageMbUsed => self.storage_mb,
        }
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::BrandVoice => self.brand_voice,
            Feature::ContentApproval => self.content_approval,
            Feature::ApiAccess => self.api_access,
        }
    }
}

/// External billing price references (Stripe price ids).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingPrices {
    pub monthly_price_id: Option<String>,
    pub yearly_price_id: Option<String>,
}

impl BillingPrices {
    pub fn is_empty(&self) -> bool {
        self.monthly_price_id.is_none() && self.yearly_price_id.is_none()
    }
}

/// Full definition of one tier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    pub tier: PlanTier,
    pub name: String,
    pub monthly_price_cents: i64,
    pub yearly_price_cents: i64,
    pub billing: BillingPrices,
    pub limits: PlanLimits,
    pub features: Vec<String>,
}

/// Immutable lookup table over the four tiers.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: [PlanConfig; 4],
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::with_billing(&HashMap::new())
    }
}

impl PlanCatalog {
    /// Build the catalog, attaching configured price ids to paid tiers.
    /// Entries for `free` are ignored.
    pub fn with_billing(prices: &HashMap<PlanTier, BillingPrices>) -> Self {
        let billing_for = |tier: PlanTier| match tier {
            PlanTier::Free => BillingPrices::default(),
            paid => prices.get(&paid).cloned().unwrap_or_default(),
        };

        Self {
            plans: [
                free_plan(),
                creator_plan(billing_for(PlanTier::Creator)),
                business_plan(billing_for(PlanTier::Business)),
                agency_plan(billing_for(PlanTier::Agency)),
            ],
        }
    }

    pub fn get_plan_config(&self, tier: PlanTier) -> &PlanConfig {
        &self.plans[tier.index()]
    }

    pub fn get_plan_limits(&self, tier: PlanTier) -> &PlanLimits {
        &self.get_plan_config(tier).limits
    }

    /// Plans in documented order.
    pub fn plans(&self) -> impl Iterator<Item = &PlanConfig> {
        self.plans.iter()
    }
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn free_plan() -> PlanConfig {
    PlanConfig {
        tier: PlanTier::Free,
        name: "Free".to_string(),
        monthly_price_cents: 0,
        yearly_price_cents: 0,
        billing: BillingPrices::default(),
        limits: PlanLimits {
            social_accounts: 3,
            posts_per_month: 10,
            ai_credits_per_month: 50,
            image_generations: 5,
            video_generations: 0,
            team_members: 1,
            storage_mb: 500,
            analytics_retention_days: 7,
            brand_voice: false,
            content_approval: false,
            api_access: false,
        },
        features: features(&[
            "3 social accounts",
            "10 posts per month",
            "50 AI credits per month",
            "5 AI image generations",
            "7-day analytics",
        ]),
    }
}

fn creator_plan(billing: BillingPrices) -> PlanConfig {
    PlanConfig {
        tier: PlanTier::Creator,
        name: "Creator".to_string(),
        monthly_price_cents: 1_900,
        yearly_price_cents: 19_000,
        billing,
        limits: PlanLimits {
            social_accounts: 10,
            posts_per_month: UNLIMITED,
            ai_credits_per_month: 500,
            image_generations: 50,
            video_generations: 5,
            team_members: 1,
            storage_mb: 5_000,
            analytics_retention_days: 90,
            brand_voice: true,
            content_approval: false,
            api_access: false,
        },
        features: features(&[
            "10 social accounts",
            "Unlimited posts",
            "500 AI credits per month",
            "50 AI image generations",
            "5 AI video generations",
            "Brand voice",
            "90-day analytics",
        ]),
    }
}

fn business_plan(billing: BillingPrices) -> PlanConfig {
    PlanConfig {
        tier: PlanTier::Business,
        name: "Business".to_string(),
        monthly_price_cents: 4_900,
        yearly_price_cents: 49_000,
        billing,
        limits: PlanLimits {
            social_accounts: 25,
            posts_per_month: UNLIMITED,
            ai_credits_per_month: 2_000,
            image_generations: 200,
            video_generations: 25,
            team_members: 5,
            storage_mb: 25_000,
            analytics_retention_days: 365,
            brand_voice: true,
            content_approval: true,
            api_access: false,
        },
        features: features(&[
            "25 social accounts",
            "Unlimited posts",
            "2,000 AI credits per month",
            "200 AI image generations",
            "25 AI video generations",
            "5 team members",
            "Brand voice",
            "Content approval workflows",
            "1-year analytics",
        ]),
    }
}

fn agency_plan(billing: BillingPrices) -> PlanConfig {
    PlanConfig {
        tier: PlanTier::Agency,
        name: "Agency".to_string(),
        monthly_price_cents: 14_900,
        yearly_price_cents: 149_000,
        billing,
        limits: PlanLimits {
            social_accounts: UNLIMITED,
            posts_per_month: UNLIMITED,
            ai_credits_per_month: UNLIMITED,
            image_generations: 1_000,
            video_generations: 100,
            team_members: UNLIMITED,
            storage_mb: 100_000,
            analytics_retention_days: 730,
            brand_voice: true,
            content_approval: true,
            api_access: true,
        },
        features: features(&[
            "Unlimited social accounts",
            "Unlimited posts",
            "Unlimited AI credits",
            "1,000 AI image generations",
            "100 AI video generations",
            "Unlimited team members",
            "Brand voice",
            "Content approval workflows",
            "API access",
            "2-year analytics",
        ]),
    }
}
