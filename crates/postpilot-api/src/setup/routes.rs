//! Route configuration and setup

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use postpilot_core::models::UsageMetric;
use postpilot_core::{Config, Feature};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::auth::{admin_auth_middleware, user_auth_middleware};
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::middleware::{feature_guard, quota_guard, FeatureGuard, QuotaGuard};
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let user_routes = user_routes(state.clone())
        .layer(from_fn_with_state(state.auth.clone(), user_auth_middleware));
    let admin_routes = admin_routes()
        .layer(from_fn_with_state(state.auth.clone(), admin_auth_middleware));

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            user_id = tracing::field::Empty,
        )
    });

    let app = public_routes()
        .merge(user_routes)
        .merge(admin_routes)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds,
        )))
        .layer(cors)
        .layer(trace_layer)
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::liveness_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route(
            &format!("{}/plans", API_PREFIX),
            get(handlers::plans::list_plans),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

/// Routes for authenticated users; metered and gated routes carry their guard.
fn user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/entitlements", API_PREFIX),
            get(handlers::entitlements::get_entitlements),
        )
        .route(
            &format!("{}/usage", API_PREFIX),
            get(handlers::usage::get_usage),
        )
        // Metered
        .route(
            &format!("{}/usage/posts", API_PREFIX),
            post(handlers::usage::record_post).route_layer(from_fn_with_state(
                QuotaGuard::new(state.clone(), UsageMetric::PostsCreated),
                quota_guard,
            )),
        )
        .route(
            &format!("{}/usage/ai-credits", API_PREFIX),
            post(handlers::usage::record_ai_credits)
                .route_layer(from_fn_with_state(
                    QuotaGuard::new(state.clone(), UsageMetric::AiCreditsUsed),
                    quota_guard,
                )),
        )
        .route(
            &format!("{}/usage/image-generations", API_PREFIX),
            post(handlers::usage::record_image_generation)
                .route_layer(from_fn_with_state(
                    QuotaGuard::new(state.clone(), UsageMetric::ImageGenerationsUsed),
                    quota_guard,
                )),
        )
        .route(
            &format!("{}/usage/video-generations", API_PREFIX),
            post(handlers::usage::record_video_generation)
                .route_layer(from_fn_with_state(
                    QuotaGuard::new(state.clone(), UsageMetric::VideoGenerationsUsed),
                    quota_guard,
                )),
        )
        .route(
            &format!("{}/usage/storage", API_PREFIX),
            post(handlers::usage::record_storage).route_layer(from_fn_with_state(
                QuotaGuard::new(state.clone(), UsageMetric::StorageMbUsed),
                quota_guard,
            )),
        )
        // Plan features
        .route(
            &format!("{}/features/brand-voice", API_PREFIX),
            get(handlers::features::brand_voice).route_layer(from_fn_with_state(
                FeatureGuard::new(state.clone(), Feature::BrandVoice),
                feature_guard,
            )),
        )
        .route(
            &format!("{}/features/content-approval", API_PREFIX),
            get(handlers::features::content_approval)
                .route_layer(from_fn_with_state(
                    FeatureGuard::new(state.clone(), Feature::ContentApproval),
                    feature_guard,
                )),
        )
        .route(
            &format!("{}/features/api-access", API_PREFIX),
            get(handlers::features::api_access).route_layer(from_fn_with_state(
                FeatureGuard::new(state.clone(), Feature::ApiAccess),
                feature_guard,
            )),
        )
}

/// Operator routes (master API key)
fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/admin/users/{{id}}/plan", API_PREFIX),
            put(handlers::admin::set_user_plan),
        )
        .route(
            &format!("{}/admin/usage/reset", API_PREFIX),
            post(handlers::admin::reset_usage),
        )
}
