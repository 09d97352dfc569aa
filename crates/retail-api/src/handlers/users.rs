//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use retail_auth::{hash_password, MIN_PASSWORD_LEN};
use retail_models::{
    record,
    validate::{is_valid_email, normalize_email},
    Role, Store, User,
};
use retail_notion::{Direction, Filter, NotionError, Query, RecordStore, Sort};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, AuthUser};
use crate::handlers::{reference, required};
use crate::state::AppState;
use crate::types::{
    ApiResponse, CreateUserRequest, DeletedResponse, UpdateUserRequest, UserListQuery,
};

/// GET /api/users - Admins list every store (or `?store_id=`), managers
/// their own.
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<ApiResponse<Vec<User>>>> {
    claims.require(Role::Manager)?;
    let store_id = claims.scope_store(query.store_id.as_deref())?;

    let query = Query::new()
        .maybe_filter(store_id.map(|id| Filter::relation("Store", &id)))
        .sort(Sort::property("Name", Direction::Ascending));
    let users = record::list(state.records(), &query).await?;

    Ok(Json(ApiResponse::list(users)))
}

/// POST /api/users - Create a user with a hashed password.
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>)> {
    claims.require(Role::Admin)?;

    let name = required(&req.name, "name")?;
    let email = checked_email(&req.email)?;
    check_password(&req.password)?;

    let store_id = req.store_id.as_deref().and_then(reference);
    check_membership(req.role, store_id.as_deref())?;
    if let Some(id) = &store_id {
        ensure_store(state.records(), id).await?;
    }
    ensure_email_free(state.records(), &email, None).await?;

    let hash = hash(req.password).await?;
    let user = User::new(name, &email, req.role, store_id).with_password_hash(hash);
    let user = record::insert(state.records(), &user).await?;
    info!(user_id = %user.id, role = %user.role, "User created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// GET /api/users/:id - Self, or a manager of the user's store.
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>> {
    let is_self = claims.is_self(&id);
    if !is_self {
        claims.require(Role::Manager)?;
    }
    let user: User = record::find(state.records(), &id).await?;
    if !is_self {
        claims.require_store(user.store_id.as_deref())?;
    }
    Ok(Json(ApiResponse::ok(user)))
}

/// PATCH /api/users/:id - Admins may change anything; users may change
/// their own name and password.
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>> {
    if !claims.is_admin() {
        if !claims.is_self(&id) {
            return Err(ApiError::Forbidden("cannot modify other users".to_string()));
        }
        if req.has_admin_fields() {
            return Err(ApiError::Forbidden(
                "only name and password can be changed".to_string(),
            ));
        }
    }

    let mut user: User = record::find(state.records(), &id).await?;

    if let Some(name) = req.name {
        user.name = required(&name, "name")?;
    }
    if let Some(email) = req.email {
        let email = checked_email(&email)?;
        ensure_email_free(state.records(), &email, Some(&id)).await?;
        user.email = email;
    }
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(store_id) = req.store_id {
        user.store_id = reference(&store_id);
        if let Some(id) = &user.store_id {
            ensure_store(state.records(), id).await?;
        }
    }
    check_membership(user.role, user.store_id.as_deref())?;
    if let Some(active) = req.active {
        if !active && claims.is_self(&id) {
            return Err(ApiError::BadRequest("cannot deactivate yourself".to_string()));
        }
        user.active = active;
    }
    if let Some(password) = req.password {
        check_password(&password)?;
        user.password_hash = hash(password).await?;
    }

    let user = record::save(state.records(), &id, &user).await?;
    info!(user_id = %id, by = %claims.sub, "User updated");
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/users/:id - Archive a user.
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    claims.require(Role::Admin)?;
    if claims.is_self(&id) {
        return Err(ApiError::BadRequest("cannot delete yourself".to_string()));
    }
    record::find::<User>(state.records(), &id).await?;
    record::archive(state.records(), &id).await?;
    info!(user_id = %id, "User archived");
    Ok(Json(ApiResponse::ok(DeletedResponse::new(id))))
}

/// Everyone but admins belongs to a store.
fn check_membership(role: Role, store_id: Option<&str>) -> Result<()> {
    if store_id.is_none() && role != Role::Admin {
        return Err(ApiError::BadRequest(format!("{} users need a store_id", role)));
    }
    Ok(())
}

fn checked_email(email: &str) -> Result<String> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("invalid email address".to_string()));
    }
    Ok(email)
}

fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn hash(password: String) -> Result<String> {
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {}", e)))??;
    Ok(hashed)
}

async fn ensure_store(store: &dyn RecordStore, id: &str) -> Result<()> {
    match record::find::<Store>(store, id).await {
        Ok(_) => Ok(()),
        Err(NotionError::NotFound(_)) => Err(ApiError::BadRequest("unknown store".to_string())),
        Err(e) => Err(e.into()),
    }
}

async fn ensure_email_free(store: &dyn RecordStore, email: &str, except: Option<&str>) -> Result<()> {
    let query = Query::new().filter(Filter::email("Email", email));
    let taken = record::list::<User>(store, &query)
        .await?
        .iter()
        .any(|u| Some(u.id.as_str()) != except);
    if taken {
        return Err(ApiError::BadRequest("email already in use".to_string()));
    }
    Ok(())
}
