//! Notification handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use retail_models::{record, Notification, Role, User};
use retail_notion::{Filter, Query, RecordStore, Sort};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, AuthUser};
use crate::handlers::required;
use crate::state::AppState;
use crate::types::{
    ApiResponse, CreateNotificationRequest, NotificationListQuery, UpdatedResponse,
};

/// Creates a notification as a side effect of another action. Failures are
/// logged and swallowed so the primary action still succeeds.
pub(crate) async fn notify(store: &dyn RecordStore, notification: Notification) {
    let user_id = notification.user_id.clone().unwrap_or_default();
    if let Err(e) = record::insert(store, &notification).await {
        warn!(user_id = %user_id, error = %e, "Failed to create notification");
    }
}

/// GET /api/notifications - The caller's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiQuery(query): ApiQuery<NotificationListQuery>,
) -> Result<Json<ApiResponse<Vec<Notification>>>> {
    let mut filters = vec![Filter::relation("User", &claims.sub)];
    if query.unread == Some(true) {
        filters.push(Filter::checkbox("Read", false));
    }

    let query = Query::new()
        .maybe_filter(Filter::all(filters))
        .sort(Sort::newest_first());
    let notifications = record::list(state.records(), &query).await?;

    Ok(Json(ApiResponse::list(notifications)))
}

/// POST /api/notifications - Send a notification to a user.
pub async fn create_notification(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>)> {
    claims.require(Role::Manager)?;
    let title = required(&req.title, "title")?;

    let target: User = record::find(state.records(), &req.user_id).await?;
    claims.require_store(target.store_id.as_deref())?;

    let mut notification = Notification::new(&target.id, title, req.body.trim());
    notification.link = req.link.trim().to_string();
    let notification = record::insert(state.records(), &notification).await?;
    info!(user_id = %target.id, by = %claims.sub, "Notification sent");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(notification))))
}

/// POST /api/notifications/:id/read - Mark one notification read.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Notification>>> {
    let mut notification: Notification = record::find(state.records(), &id).await?;
    if notification.user_id.as_deref() != Some(claims.sub.as_str()) {
        return Err(ApiError::Forbidden("not your notification".to_string()));
    }
    if notification.read {
        return Ok(Json(ApiResponse::ok(notification)));
    }

    notification.read = true;
    let notification = record::save(state.records(), &id, &notification).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// POST /api/notifications/read-all - Mark every unread notification read.
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UpdatedResponse>>> {
    let query = Query::new().maybe_filter(Filter::all(vec![
        Filter::relation("User", &claims.sub),
        Filter::checkbox("Read", false),
    ]));
    let unread: Vec<Notification> = record::list(state.records(), &query).await?;

    let mut updated = 0;
    for mut notification in unread {
        notification.read = true;
        record::save(state.records(), &notification.id, &notification).await?;
        updated += 1;
    }

    Ok(Json(ApiResponse::ok(UpdatedResponse { updated })))
}
