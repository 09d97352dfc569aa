//! Rate limiting middleware.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};

use retail_auth::{Decision, RateLimiter};

use crate::error::ApiError;
use crate::extract::client_ip;
use crate::state::AppState;

/// Applies the global per-client limit.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    limit_with(&state.limiter, request, next).await
}

/// Applies the stricter login limit.
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    limit_with(&state.login_limiter, request, next).await
}

async fn limit_with(limiter: &RateLimiter, request: Request, next: Next) -> Response {
    let key = client_ip(request.headers(), request.extensions());

    match limiter.check_now(&key) {
        Decision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
                response.headers_mut().insert("x-ratelimit-remaining", value);
            }
            response
        }
        Decision::Limited { retry_after } => ApiError::RateLimited {
            retry_after: ceil_secs(retry_after),
        }
        .into_response(),
    }
}

/// Whole seconds, rounded up, never zero.
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
        assert_eq!(ceil_secs(Duration::from_millis(1500)), 2);
        assert_eq!(ceil_secs(Duration::from_secs(30)), 30);
        assert_eq!(ceil_secs(Duration::ZERO), 1);
    }
}
