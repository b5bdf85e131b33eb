use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The upstream catalog could not be reached or answered with a server error.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream catalog answered, but rejected the request.
    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether repeating the same upstream request may succeed.
    ///
    /// Only connectivity failures and upstream 5xx answers qualify. Client
    /// errors and undecodable bodies fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::UpstreamUnavailable(_) => true,
            AppError::HttpClient(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = matches!(self, AppError::UpstreamUnavailable(_));
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UpstreamUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = if retryable {
            Json(json!({ "error": message, "retryable": true }))
        } else {
            Json(json!({ "error": message }))
        };

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_unavailable_is_retryable() {
        assert!(AppError::UpstreamUnavailable("503".to_string()).is_retryable());
    }

    #[test]
    fn test_client_side_errors_are_not_retryable() {
        assert!(!AppError::ExternalApi("401".to_string()).is_retryable());
        assert!(!AppError::InvalidInput("bad".to_string()).is_retryable());
        assert!(!AppError::NotFound("movie 1".to_string()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::UpstreamUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AppError::ExternalApi("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
