//! Login and session handlers.

use axum::{extract::State, Json};
use tracing::{debug, info};

use retail_auth::verify_credentials;
use retail_models::{record, validate::normalize_email, User};
use retail_notion::{Filter, Query};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, AuthUser};
use crate::state::AppState;
use crate::types::{ApiResponse, LoginRequest, LoginResponse};

/// POST /api/auth/login - Exchange email and password for a token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let query = Query::new().filter(Filter::email("Email", &email)).limit(1);
    let found = record::list::<User>(state.records(), &query)
        .await?
        .into_iter()
        .next();

    let stored = found.as_ref().map(|u| u.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || {
        verify_credentials(&req.password, stored.as_deref())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("password check failed: {}", e)))?;

    let Some(user) = found.filter(|_| verified) else {
        debug!(email = %email, "Login failed");
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    };
    if !user.active {
        return Err(ApiError::Forbidden("account is disabled".to_string()));
    }

    let token = state.tokens.issue(&user)?;
    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(ApiResponse::ok(LoginResponse {
        token,
        expires_in: state.tokens.ttl().as_secs(),
        user,
    })))
}

/// GET /api/auth/me - The current user, re-read from the store.
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<User>>> {
    let user: User = record::find(state.records(), &claims.sub).await?;
    if !user.active {
        return Err(ApiError::Forbidden("account is disabled".to_string()));
    }
    Ok(Json(ApiResponse::ok(user)))
}
