//! Test helpers: build AppState and router for integration tests.
//!
//! Stores are in memory so the suite needs no database:
//! `cargo test -p postpilot-api`.

pub mod auth;

use std::collections::HashMap;
use std::sync::Arc;

use axum_test::TestServer;
use postpilot_api::constants;
use postpilot_api::setup::routes;
use postpilot_api::state::AppState;
use postpilot_core::{
    Config, InMemoryUsageStore, InMemoryUserStore, PlanTier, UsageStore, UserStore,
};
use uuid::Uuid;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", auth::TEST_JWT_SECRET),
        ("MASTER_API_KEY", auth::TEST_MASTER_API_KEY),
        ("STORE_BACKEND", "memory"),
        ("USAGE_RESET_ENABLED", "false"),
        ("STRIPE_PRICE_CREATOR_MONTHLY", "price_creator_monthly"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test config should parse")
}

/// Test application: server plus handles on the in-memory stores.
pub struct TestApp {
    pub server: TestServer,
    pub usage: InMemoryUsageStore,
    pub users: InMemoryUserStore,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a user on `tier` and return a bearer token for them.
    pub async fn user_on(&self, tier: Option<PlanTier>) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        self.users.insert_user(user_id, tier).await;
        (user_id, auth::token_for(user_id))
    }
}

pub fn server_with(usage: Arc<dyn UsageStore>, users: Arc<dyn UserStore>) -> TestServer {
    let config = test_config();
    let state = Arc::new(AppState::new(config.clone(), usage, users));
    let router = routes::setup_routes(&config, state).expect("routes should build");
    TestServer::new(router).expect("test server should start")
}

pub fn setup_test_app() -> TestApp {
    let usage = InMemoryUsageStore::new();
    let users = InMemoryUserStore::new();
    let server = server_with(Arc::new(usage.clone()), Arc::new(users.clone()));
    TestApp {
        server,
        usage,
        users,
    }
}
