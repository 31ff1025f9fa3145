use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use postpilot_core::AppError;
use subtle::ConstantTimeEq;

use crate::auth::jwt::JwtService;
use crate::auth::models::UserContext;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub master_api_key: String,
    pub jwt: JwtService,
}

impl AuthState {
    pub fn new(jwt_secret: &str, master_api_key: String) -> Self {
        Self {
            master_api_key,
            jwt: JwtService::new(jwt_secret),
        }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })
}

/// Verify the bearer JWT and attach a [`UserContext`].
pub async fn user_auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match bearer_token(request.headers()).and_then(|t| auth_state.jwt.verify(t)) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::Span::current().record("user_id", tracing::field::display(claims.sub));
    request.extensions_mut().insert(UserContext {
        user_id: claims.sub,
    });
    next.run(request).await
}

/// Only the master API key passes.
pub async fn admin_auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => return HttpAppError(e).into_response(),
    };

    if !secure_compare(token, &auth_state.master_api_key) {
        tracing::warn!("Rejected admin request with invalid key");
        return HttpAppError(AppError::Unauthorized("Invalid admin key".to_string()))
            .into_response();
    }
    next.run(request).await
}
