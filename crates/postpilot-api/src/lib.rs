//! PostPilot entitlements API
//!
//! HTTP surface for plan catalog, usage metering and plan-gated routes.

mod api_doc;
pub mod constants;
mod handlers;
pub mod jobs;
pub mod middleware;
pub mod setup;
mod telemetry;

pub mod auth;
pub mod error;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
