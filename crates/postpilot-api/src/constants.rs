//! API constants
//!
//! Route prefixes shared by the router and the OpenAPI document.

/// Versioned prefix every entitlement route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// `amount` recorded when a usage request carries none.
pub const DEFAULT_USAGE_AMOUNT: i64 = 1;
