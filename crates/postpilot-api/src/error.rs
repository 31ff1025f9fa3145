//! HTTP error response conversion
//!
//! Handlers and middleware return `Result<_, HttpAppError>`; every `AppError`
//! renders through [`ErrorResponse`] with a consistent status, body and log line.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use postpilot_core::{AppError, ErrorMetadata, LogLevel};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Counter value at the time of a quota denial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<i64>,
    /// Plan limit at the time of a quota denial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
            current: None,
            limit: None,
            details: None,
            error_type: None,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both `IntoResponse` and `AppError` are foreign here).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request denied");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Build the response body for an error; `expose_details` controls debug fields.
pub fn error_body(app_error: &AppError, expose_details: bool) -> ErrorResponse {
    let mut body = ErrorResponse::new(app_error.client_message(), app_error.error_code());
    if let Some((current, limit)) = app_error.quota_values() {
        body.current = Some(current);
        body.limit = Some(limit);
    }
    if expose_details && !app_error.is_sensitive() {
        body.details = Some(app_error.detailed_message());
        body.error_type = Some(app_error.error_type().to_string());
    }
    body
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = error_body(app_error, !is_production_env());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postpilot_core::models::UsageMetric;
    use postpilot_core::{Feature, PlanTier};

    #[test]
    fn test_quota_body_echoes_counters() {
        let err = AppError::QuotaExceeded {
            metric: UsageMetric::PostsCreated,
            current: 10,
            limit: 10,
        };
        let json = serde_json::to_value(error_body(&err, false)).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "QUOTA_EXCEEDED");
        assert_eq!(json["error"], "Usage limit exceeded. Please upgrade your plan.");
        assert_eq!(json["current"], 10);
        assert_eq!(json["limit"], 10);
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_feature_body_has_no_counters() {
        let err = AppError::FeatureNotAvailable {
            tier: PlanTier::Creator,
            feature: Feature::ApiAccess,
        };
        let json = serde_json::to_value(error_body(&err, false)).expect("serialize");
        assert_eq!(json["code"], "FEATURE_NOT_AVAILABLE");
        assert_eq!(
            json["error"],
            "Your creator plan does not include apiAccess. Please upgrade your plan."
        );
        assert!(json.get("current").is_none());
        assert!(json.get("limit").is_none());
    }

    #[test]
    fn test_sensitive_errors_never_expose_details() {
        let err = AppError::Internal("pool exhausted".to_string());
        let body = error_body(&err, true);
        assert!(body.details.is_none());
        assert_eq!(body.error, "An internal error occurred");

        let err = AppError::InvalidInput("amount missing".to_string());
        let body = error_body(&err, true);
        assert_eq!(body.error_type.as_deref(), Some("InvalidInput"));
    }

    #[test]
    fn test_status_codes() {
        let response = HttpAppError(AppError::Unauthorized("no token".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let response = HttpAppError(AppError::QuotaExceeded {
            metric: UsageMetric::AiCreditsUsed,
            current: 50,
            limit: 50,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
