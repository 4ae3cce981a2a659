use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Failure conditions of an optimization workflow.
///
/// These are stored inside the workflow state, so they carry no technical
/// detail: `Display` is the generic message shown to the user. The underlying
/// cause is logged where the error is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WorkflowError {
    #[error("No active subscription. Choose a plan to start optimizing.")]
    NoSubscription,

    #[error("You have used all optimizations in your plan. Upgrade to continue.")]
    QuotaExhausted,

    #[error("Optimization failed. Please try again.")]
    OptimizeFailure,

    #[error("Scoring is temporarily unavailable.")]
    ScoringFailure,

    #[error("Your session has expired. Please sign in again.")]
    SessionInvalid,

    #[error("{0}")]
    ValidationFailure(String),

    #[error("Your resume is ready, but recording usage failed. Please contact support if this persists.")]
    UsageCommitFailure,

    #[error("The service is temporarily unavailable. Please try again.")]
    ServiceUnavailable,
}

impl WorkflowError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::NoSubscription => "NO_SUBSCRIPTION",
            WorkflowError::QuotaExhausted => "QUOTA_EXHAUSTED",
            WorkflowError::OptimizeFailure => "OPTIMIZE_FAILURE",
            WorkflowError::ScoringFailure => "SCORING_FAILURE",
            WorkflowError::SessionInvalid => "SESSION_INVALID",
            WorkflowError::ValidationFailure(_) => "VALIDATION_ERROR",
            WorkflowError::UsageCommitFailure => "USAGE_COMMIT_FAILURE",
            WorkflowError::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "SIGN_IN_REQUIRED",
                "Authentication required".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Workflow(err) => {
                let status = match err {
                    WorkflowError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
                    WorkflowError::SessionInvalid => StatusCode::UNAUTHORIZED,
                    WorkflowError::NoSubscription | WorkflowError::QuotaExhausted => {
                        StatusCode::PAYMENT_REQUIRED
                    }
                    WorkflowError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code(), err.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Cache(e) => {
                tracing::error!("Redis error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CACHE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_messages_hide_detail() {
        let msg = WorkflowError::OptimizeFailure.to_string();
        assert_eq!(msg, "Optimization failed. Please try again.");
    }

    #[test]
    fn test_workflow_error_serde_tagged() {
        let value = serde_json::to_value(WorkflowError::QuotaExhausted).unwrap();
        assert_eq!(value["kind"], "quota_exhausted");

        let value =
            serde_json::to_value(WorkflowError::ValidationFailure("x".to_string())).unwrap();
        assert_eq!(value["kind"], "validation_failure");
        assert_eq!(value["detail"], "x");
    }

    #[test]
    fn test_quota_error_maps_to_payment_required() {
        let response = AppError::from(WorkflowError::QuotaExhausted).into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
