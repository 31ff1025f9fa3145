//! Feature guard integration tests.
//!
//! Run with: `cargo test -p postpilot-api --test features_test`

mod helpers;

use helpers::auth::bearer;
use helpers::{api_path, setup_test_app};
use postpilot_core::PlanTier;
use serde_json::Value;

#[tokio::test]
async fn test_free_user_denied_brand_voice() {
    let app = setup_test_app();
    let (_, token) = app.user_on(Some(PlanTier::Free)).await;

    let response = app
        .client()
        .get(&api_path("/features/brand-voice"))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "FEATURE_NOT_AVAILABLE");
    assert_eq!(
        body["error"],
        "Your free plan does not include brandVoice. Please upgrade your plan."
    );
    assert!(body.get("current").is_none());
}

#[tokio::test]
async fn test_missing_tier_denied_like_free() {
    let app = setup_test_app();
    let (_, token) = app.user_on(None).await;

    let response = app
        .client()
        .get(&api_path("/features/brand-voice"))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Your free plan does not include brandVoice. Please upgrade your plan."
    );
}

#[tokio::test]
async fn test_creator_gets_brand_voice_only() {
    let app = setup_test_app();
    let (_, token) = app.user_on(Some(PlanTier::Creator)).await;

    let response = app
        .client()
        .get(&api_path("/features/brand-voice"))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["feature"], "brandVoice");
    assert_eq!(body["tier"], "creator");

    let response = app
        .client()
        .get(&api_path("/features/content-approval"))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_api_access_is_agency_only() {
    let app = setup_test_app();
    let expectations = [
        (PlanTier::Free, 403),
        (PlanTier::Creator, 403),
        (PlanTier::Business, 403),
        (PlanTier::Agency, 200),
    ];

    for (tier, status) in expectations {
        let (_, token) = app.user_on(Some(tier)).await;
        let response = app
            .client()
            .get(&api_path("/features/api-access"))
            .add_header("Authorization", bearer(&token))
            .await;
        assert_eq!(response.status_code(), status, "tier {}", tier);
    }
}

#[tokio::test]
async fn test_feature_check_does_not_touch_usage() {
    let app = setup_test_app();
    let (_, token) = app.user_on(Some(PlanTier::Business)).await;

    let response = app
        .client()
        .get(&api_path("/features/content-approval"))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(app.usage.is_empty().await);
}

#[tokio::test]
async fn test_feature_route_requires_token() {
    let app = setup_test_app();
    let response = app.client().get(&api_path("/features/brand-voice")).await;
    assert_eq!(response.status_code(), 401);
}
