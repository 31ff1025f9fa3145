pub mod admin;
pub mod entitlements;
pub mod features;
pub mod health;
pub mod plans;
pub mod usage;
