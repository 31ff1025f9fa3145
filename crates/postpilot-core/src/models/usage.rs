use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::period::PeriodId;

/// Tracked consumption counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UsageMetric {
    PostsCreated,
    AiCreditsUsed,
    ImageGenerationsUsed,
    VideoGenerationsUsed,
    #[serde(rename = "storageMBUsed")]
    StorageMbUsed,
}

impl UsageMetric {
    pub const ALL: [UsageMetric; 5] = [
        UsageMetric::PostsCreated,
        UsageMetric::AiCreditsUsed,
        UsageMetric::ImageGenerationsUsed,
        UsageMetric::VideoGenerationsUsed,
        UsageMetric::StorageMbUsed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageMetric::PostsCreated => "postsCreated",
            UsageMetric::AiCreditsUsed => "aiCreditsUsed",
            UsageMetric::ImageGenerationsUsed => "imageGenerationsUsed",
            UsageMetric::VideoGenerationsUsed => "videoGenerationsUsed",
            UsageMetric::StorageMbUsed => "storageMBUsed",
        }
    }

    /// Column in `usage_periods` holding this counter.
    pub fn column(&self) -> &'static str {
        match self {
            UsageMetric::PostsCreated => "posts_created",
            UsageMetric::AiCreditsUsed => "ai_credits_used",
            UsageMetric::ImageGenerationsUsed => "image_generations_used",
            UsageMetric::VideoGenerationsUsed => "video_generations_used",
            UsageMetric::StorageMbUsed => "storage_mb_used",
        }
    }
}

impl Display for UsageMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Per-user, per-month usage counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct UsagePeriod {
    pub user_id: Uuid,
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    #[schema(value_type = String, example = "2026-10")]
    pub period_id: PeriodId,
    pub posts_created: i64,
    pub ai_credits_used: i64,
    pub image_generations_used: i64,
    pub video_generations_used: i64,
    #[serde(rename = "storageMBUsed")]
    pub storage_mb_used: i64,
}

impl UsagePeriod {
    /// All counters at zero.
    pub fn zeroed(user_id: Uuid, period_id: PeriodId) -> Self {
        Self {
            user_id,
            period_id,
            posts_created: 0,
            ai_credits_used: 0,
            image_generations_used: 0,
            video_generations_used: 0,
            storage_mb_used: 0,
        }
    }

    pub fn get(&self, metric: UsageMetric) -> i64 {
        match metric {
            UsageMetric::PostsCreated => self.posts_created,
            UsageMetric::AiCreditsUsed => self.ai_credits_used,
            UsageMetric::ImageGenerationsUsed => self.image_generations_used,
            UsageMetric::VideoGenerationsUsed => self.video_generations_used,
            UsageMetric::StorageMbUsed => self.storage_mb_used,
        }
    }

    pub(crate) fn counter_mut(&mut self, metric: UsageMetric) -> &mut i64 {
        match metric {
            UsageMetric::PostsCreated => &mut self.posts_created,
            UsageMetric::AiCreditsUsed => &mut self.ai_credits_used,
            UsageMetric::ImageGenerationsUsed => &mut self.image_generations_used,
            UsageMetric::VideoGenerationsUsed => &mut self.video_generations_used,
            UsageMetric::StorageMbUsed => &mut self.storage_mb_used,
        }
    }
}
