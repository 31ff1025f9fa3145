pub mod plan_guard;

pub use plan_guard::{feature_guard, quota_guard, FeatureGuard, QuotaGuard};
