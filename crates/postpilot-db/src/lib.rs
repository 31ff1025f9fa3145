//! PostPilot Database Layer
//!
//! Postgres-backed implementations of the entitlement store traits.

pub mod db;

pub use db::{UsageRepository, UserRepository};
