use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clearsky_core::envelope::{HealthFailure, ResultEnvelope};
use clearsky_harmony::HarmonyApiError;

/// Message attached to every failed health check.
pub const MSG_HEALTH_FAILED: &str = "Failed to connect to Harmony API";

/// Application-level error type for forwarding handlers.
///
/// Every variant renders as a JSON envelope; no error codes are
/// distinguished beyond the HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A forwarded call to the Harmony API failed.
    #[error("{message}: {source}")]
    Upstream {
        /// What the forwarder was trying to do.
        message: &'static str,
        #[source]
        source: HarmonyApiError,
    },

    /// The health check could not reach a healthy backend.
    #[error("Health check failed: {0}")]
    Unhealthy(#[source] HarmonyApiError),

    /// The inbound body was not parseable JSON.
    #[error("{message}: {rejection}")]
    InvalidBody {
        message: &'static str,
        rejection: JsonRejection,
    },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn upstream(message: &'static str) -> impl FnOnce(HarmonyApiError) -> Self {
        move |source| Self::Upstream { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Upstream { message, source } => {
                tracing::error!(error = %source, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(ResultEnvelope::<()>::failure(message, source.to_string())),
                )
                    .into_response()
            }
            AppError::Unhealthy(source) => {
                tracing::error!(error = %source, "Health check failed");
                let body = HealthFailure {
                    status: "unhealthy".to_string(),
                    message: MSG_HEALTH_FAILED.to_string(),
                    error: source.to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                };
                (StatusCode::SERVICE_UNAVAILABLE, axum::Json(body)).into_response()
            }
            AppError::InvalidBody { message, rejection } => {
                tracing::warn!(error = %rejection, "Rejected request body");
                (
                    rejection.status(),
                    axum::Json(ResultEnvelope::<()>::failure(
                        message,
                        rejection.body_text(),
                    )),
                )
                    .into_response()
            }
        }
    }
}
