//! Database repositories for data access layer
//!
//! Each repository owns one table and implements the matching store trait
//! from `postpilot-core`.

pub mod usage;
pub mod user;

pub use usage::UsageRepository;
pub use user::UserRepository;
