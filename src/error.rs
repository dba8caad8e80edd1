use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use http::StatusCode;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("rate {from}->{to} for {date} is not available: {reason}")]
    RateUnavailable {
        from: String,
        to: String,
        date: NaiveDate,
        reason: String,
    },
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("unexpected upstream response: {0}")]
    UnexpectedResponse(String),
    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = core::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateUnavailable { .. } => StatusCode::NOT_FOUND,
            AppError::Upstream(_) | AppError::UnexpectedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::Cache(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::UnexpectedResponse(value.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
