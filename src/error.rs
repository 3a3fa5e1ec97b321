use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Backend request failed: {0}")]
    Backend(#[from] reqwest::Error),

    #[error("Backend returned an invalid response: {0}")]
    Envelope(String),

    /// HTTP 403 from the backend's queue endpoint. Carries the backend's
    /// verbatim message ("Local execution is disabled ...") so the caller
    /// sees an actionable reason, not a generic failure.
    #[error("{0}")]
    ExecutionDisabled(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::Backend(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            DashboardError::Backend(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Envelope(_) => StatusCode::BAD_GATEWAY,
            DashboardError::ExecutionDisabled(_) => StatusCode::FORBIDDEN,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
