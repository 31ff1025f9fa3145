//! Store backend selection.

use std::sync::Arc;

use anyhow::{Context, Result};
use postpilot_core::{
    Config, InMemoryUsageStore, InMemoryUserStore, StoreBackend, UsageStore, UserStore,
};
use postpilot_db::{UsageRepository, UserRepository};

pub async fn setup_stores(config: &Config) -> Result<(Arc<dyn UsageStore>, Arc<dyn UserStore>)> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORE_BACKEND is postgres")?;
            let pool = super::database::setup_database(config, url).await?;
            Ok((
                Arc::new(UsageRepository::new(pool.clone())),
                Arc::new(UserRepository::new(pool)),
            ))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; usage is lost on restart");
            Ok((
                Arc::new(InMemoryUsageStore::new()),
                Arc::new(InMemoryUserStore::new()),
            ))
        }
    }
}
