//! Data models for the entitlements domain

mod usage;
mod user;

pub use usage::*;
pub use user::*;
