//! API error types.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use retail_auth::AuthError;
use retail_notion::NotionError;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error type for consistent error responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid or expired credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Too many requests from this client.
    #[error("too many requests, retry in {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// The record store failed. Details are logged, not returned.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients.
    fn public_message(&self) -> String {
        match self {
            ApiError::Upstream(_) => "upstream service error".to_string(),
            ApiError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(_) | ApiError::Upstream(_) => error!(error = %self, "Request failed"),
            _ => debug!(status = status.as_u16(), error = %self, "Request rejected"),
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));
        let mut response = (status, body).into_response();

        if let ApiError::RateLimited { retry_after } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<NotionError> for ApiError {
    fn from(err: NotionError) -> Self {
        match err {
            NotionError::NotFound(_) => ApiError::NotFound("record not found".to_string()),
            NotionError::RateLimited { retry_after } => ApiError::RateLimited {
                retry_after: retry_after.unwrap_or(1),
            },
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden(msg) => ApiError::Forbidden(msg),
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::Expired => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::WeakSecret(_)
            | AuthError::InvalidTtl(_)
            | AuthError::Signing(_)
            | AuthError::PasswordHash(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
