//! Configuration module
//!
//! Environment-driven configuration for the entitlements service: server,
//! store backend, auth secrets, the monthly reset job and billing price ids.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use crate::plans::{BillingPrices, PlanTier};

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USAGE_RESET_CHECK_INTERVAL_SECS: u64 = 3600;
const MIN_PRODUCTION_JWT_SECRET_LEN: usize = 32;

/// Where usage and user records live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local maps; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!(
                "Invalid STORE_BACKEND '{}': expected 'postgres' or 'memory'",
                other
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
    pub jwt_secret: String,
    pub master_api_key: String,
    pub usage_reset_enabled: bool,
    pub usage_reset_check_interval_secs: u64,
    pub billing_prices: HashMap<PlanTier, BillingPrices>,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let jwt_secret =
            lookup("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let master_api_key = lookup("MASTER_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("MASTER_API_KEY must be set"))?;

        let mut billing_prices = HashMap::new();
        for tier in [PlanTier::Creator, PlanTier::Business, PlanTier::Agency] {
            let prefix = format!("STRIPE_PRICE_{}", tier.as_str().to_uppercase());
            let prices = BillingPrices {
                monthly_price_id: lookup(&format!("{}_MONTHLY", prefix))
                    .filter(|s| !s.trim().is_empty()),
                yearly_price_id: lookup(&format!("{}_YEARLY", prefix))
                    .filter(|s| !s.trim().is_empty()),
            };
            if !prices.is_empty() {
                billing_prices.insert(tier, prices);
            }
        }

        Ok(Config {
            server_port: parse_or(&lookup, "SERVER_PORT", SERVER_PORT),
            environment,
            cors_origins,
            store_backend,
            database_url: lookup("DATABASE_URL"),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or(&lookup, "DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            request_timeout_seconds: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS)
                .max(1),
            jwt_secret,
            master_api_key,
            usage_reset_enabled: parse_or(&lookup, "USAGE_RESET_ENABLED", true),
            usage_reset_check_interval_secs: parse_or(
                &lookup,
                "USAGE_RESET_CHECK_INTERVAL_SECS",
                USAGE_RESET_CHECK_INTERVAL_SECS,
            )
            .max(1),
            billing_prices,
        })
    }

    /// Fail fast on misconfiguration before anything starts.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.store_backend == StoreBackend::Postgres && self.database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be set when STORE_BACKEND is postgres"
            ));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("JWT_SECRET cannot be empty"));
        }
        if self.master_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("MASTER_API_KEY cannot be empty"));
        }
        if self.is_production() {
            if self.jwt_secret.len() < MIN_PRODUCTION_JWT_SECRET_LEN {
                return Err(anyhow::anyhow!(
                    "JWT_SECRET must be at least {} bytes in production",
                    MIN_PRODUCTION_JWT_SECRET_LEN
                ));
            }
            if self.cors_origins.iter().any(|o| o == "*") {
                return Err(anyhow::anyhow!(
                    "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
                ));
            }
            if self.store_backend == StoreBackend::Memory {
                return Err(anyhow::anyhow!(
                    "STORE_BACKEND=memory is not allowed in production"
                ));
            }
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("JWT_SECRET", "dev-secret"),
        ("MASTER_API_KEY", "master"),
        ("DATABASE_URL", "postgres://localhost/postpilot"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.db_max_connections, 20);
        assert!(config.usage_reset_enabled);
        assert_eq!(config.usage_reset_check_interval_secs, 3600);
        assert!(config.billing_prices.is_empty());
        assert!(!config.is_production());
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_secrets_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("MASTER_API_KEY", "m")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", "s")])).is_err());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("MASTER_API_KEY", "m"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());

        let memory = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("MASTER_API_KEY", "m"),
            ("STORE_BACKEND", "memory"),
        ]))
        .unwrap();
        memory.validate().unwrap();
    }

    #[test]
    fn test_production_rules() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ENVIRONMENT", "production"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        // Short secret and wildcard CORS.
        assert!(config.validate().is_err());

        pairs[0] = ("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        pairs.push(("CORS_ORIGINS", "https://app.postpilot.io"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_billing_prices_from_env() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("STRIPE_PRICE_CREATOR_MONTHLY", "price_c_m"));
        pairs.push(("STRIPE_PRICE_AGENCY_YEARLY", "price_a_y"));
        pairs.push(("STRIPE_PRICE_BUSINESS_MONTHLY", "  "));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(
            config.billing_prices[&PlanTier::Creator]
                .monthly_price_id
                .as_deref(),
            Some("price_c_m")
        );
        assert_eq!(
            config.billing_prices[&PlanTier::Agency]
                .yearly_price_id
                .as_deref(),
            Some("price_a_y")
        );
        assert!(!config.billing_prices.contains_key(&PlanTier::Business));
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "not-a-port"));
        pairs.push(("USAGE_RESET_CHECK_INTERVAL_SECS", "0"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.usage_reset_check_interval_secs, 1);
    }
}
