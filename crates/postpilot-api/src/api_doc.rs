//! OpenAPI documentation.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use postpilot_core::{models, plans, quota};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
            components.add_security_scheme(
                "master_key",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PostPilot Entitlements API",
        version = "0.1.0",
        description = "Plan catalog, monthly usage metering and plan-gated access checks. All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Health
        handlers::health::liveness_check,
        handlers::health::readiness_check,
        // Plans
        handlers::plans::list_plans,
        handlers::entitlements::get_entitlements,
        // Usage
        handlers::usage::get_usage,
        handlers::usage::record_post,
        handlers::usage::record_ai_credits,
        handlers::usage::record_image_generation,
        handlers::usage::record_video_generation,
        handlers::usage::record_storage,
        // Features
        handlers::features::brand_voice,
        handlers::features::content_approval,
        handlers::features::api_access,
        // Admin
        handlers::admin::set_user_plan,
        handlers::admin::reset_usage,
    ),
    components(
        schemas(
            plans::PlanTier,
            plans::Feature,
            plans::PlanLimits,
            plans::PlanConfig,
            plans::BillingPrices,
            models::UsageMetric,
            models::UsagePeriod,
            models::User,
            quota::LimitCheck,
            quota::MetricStatus,
            quota::EntitlementSummary,
            handlers::health::HealthResponse,
            handlers::plans::PlansResponse,
            handlers::entitlements::EntitlementsResponse,
            handlers::usage::RecordUsageRequest,
            handlers::usage::UsageResponse,
            handlers::usage::RecordUsageResponse,
            handlers::features::FeatureAccessResponse,
            handlers::admin::SetPlanRequest,
            handlers::admin::SetPlanResponse,
            handlers::admin::ResetUsageResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "plans", description = "Plan catalog and caller entitlements"),
        (name = "entitlements", description = "Caller entitlement summary"),
        (name = "usage", description = "Monthly usage metering"),
        (name = "features", description = "Plan-gated features"),
        (name = "admin", description = "Operator endpoints")
    )
)]
pub struct ApiDoc;
