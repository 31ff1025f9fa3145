pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{issue_token, JwtService};
pub use middleware::{admin_auth_middleware, user_auth_middleware, AuthState};
pub use models::{JwtClaims, UserContext};
