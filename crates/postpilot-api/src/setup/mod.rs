//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod stores;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use postpilot_core::Config;
use tokio::task::JoinHandle;

use crate::jobs::UsageResetScheduler;
use crate::state::AppState;

/// Initialize the entire application. The reset job handle, when the job is
/// enabled, is returned so shutdown can stop it.
pub async fn initialize_app(
    config: Config,
) -> Result<(Arc<AppState>, axum::Router, Option<JoinHandle<()>>)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(&config.environment)
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment,
        store_backend = ?config.store_backend,
        "Configuration loaded and validated successfully"
    );

    let (usage_store, users) = stores::setup_stores(&config).await?;
    let state = Arc::new(AppState::new(config.clone(), usage_store, users));

    let usage_reset = spawn_usage_reset(&config, &state);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router, usage_reset))
}

/// Start the monthly reset job unless `USAGE_RESET_ENABLED=false`.
pub fn spawn_usage_reset(config: &Config, state: &AppState) -> Option<JoinHandle<()>> {
    if !config.usage_reset_enabled {
        tracing::info!("Usage reset scheduler disabled");
        return None;
    }
    let scheduler = Arc::new(UsageResetScheduler::new(
        state.usage().clone(),
        Duration::from_secs(config.usage_reset_check_interval_secs),
    ));
    Some(scheduler.start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postpilot_core::{InMemoryUsageStore, InMemoryUserStore};
    use std::collections::HashMap;

    fn config(reset_enabled: &str) -> Config {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("JWT_SECRET", "secret"),
            ("MASTER_API_KEY", "master"),
            ("STORE_BACKEND", "memory"),
            ("USAGE_RESET_ENABLED", reset_enabled),
        ]);
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    fn state(config: &Config) -> AppState {
        AppState::new(
            config.clone(),
            Arc::new(InMemoryUsageStore::new()),
            Arc::new(InMemoryUserStore::new()),
        )
    }

    #[tokio::test]
    async fn test_disabled_reset_spawns_nothing() {
        let config = config("false");
        assert!(spawn_usage_reset(&config, &state(&config)).is_none());
    }

    #[tokio::test]
    async fn test_reset_job_handle_stops_on_abort() {
        let config = config("true");
        let handle = spawn_usage_reset(&config, &state(&config)).unwrap();
        assert!(!handle.is_finished());

        handle.abort();
        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
