//! Shared application state.
//!
//! Built once at startup and handed to the router as `Arc<AppState>`. The
//! stores are trait objects so the same wiring serves postgres and the
//! in-memory dev/test backend.

use std::sync::Arc;

use postpilot_core::{
    Config, EntitlementService, PlanCatalog, UsageStore, UsageTracker, UserStore,
};

use crate::auth::AuthState;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub entitlements: EntitlementService,
    pub users: Arc<dyn UserStore>,
    pub usage_store: Arc<dyn UsageStore>,
    pub auth: Arc<AuthState>,
}

impl AppState {
    pub fn new(config: Config, usage_store: Arc<dyn UsageStore>, users: Arc<dyn UserStore>) -> Self {
        let catalog = Arc::new(PlanCatalog::with_billing(&config.billing_prices));
        let tracker = UsageTracker::new(usage_store.clone(), users.clone());
        let entitlements = EntitlementService::new(catalog, users.clone(), tracker);
        let auth = Arc::new(AuthState::new(
            &config.jwt_secret,
            config.master_api_key.clone(),
        ));

        Self {
            config,
            entitlements,
            users,
            usage_store,
            auth,
        }
    }

    pub fn usage(&self) -> &UsageTracker {
        self.entitlements.usage()
    }

    pub fn catalog(&self) -> &PlanCatalog {
        self.entitlements.catalog()
    }
}
