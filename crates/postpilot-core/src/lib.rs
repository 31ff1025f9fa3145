//! PostPilot Core Library
//!
//! Plan catalog, usage metering and entitlement checks shared by the
//! database layer and the HTTP service.

pub mod config;
pub mod error;
pub mod models;
pub mod period;
pub mod plans;
pub mod quota;
pub mod store;
pub mod usage;

// Re-export commonly used types
pub use config::{Config, StoreBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use period::PeriodId;
pub use plans::{BillingPrices, Feature, PlanCatalog, PlanConfig, PlanLimits, PlanTier, UNLIMITED};
pub use quota::{EntitlementService, EntitlementSummary, FeatureCheck, LimitCheck, MetricStatus};
pub use store::{InMemoryUsageStore, InMemoryUserStore, UsageStore, UserStore};
pub use usage::UsageTracker;
