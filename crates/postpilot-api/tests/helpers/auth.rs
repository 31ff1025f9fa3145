use chrono::Duration;
use postpilot_api::auth::issue_token;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Test master API key (must match test_config).
pub const TEST_MASTER_API_KEY: &str = "test-master-api-key-at-least-32-characters-long";

pub fn token_for(user_id: Uuid) -> String {
    issue_token(TEST_JWT_SECRET, user_id, Duration::hours(1)).expect("token should sign")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
