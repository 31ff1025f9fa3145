pub mod usage_reset;

pub use usage_reset::{ResetTick, UsageResetScheduler};
