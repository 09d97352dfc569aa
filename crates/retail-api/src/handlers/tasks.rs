//! Task handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use tracing::info;

use retail_auth::Claims;
use retail_models::{record, Notification, Role, Task, User};
use retail_notion::{Filter, NotionError, Query, RecordStore, Sort};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, AuthUser};
use crate::handlers::notifications::notify;
use crate::handlers::{reference, required};
use crate::state::AppState;
use crate::types::{
    ApiResponse, CreateTaskRequest, DeletedResponse, TaskListQuery, UpdateTaskRequest,
};

/// GET /api/tasks - List tasks, newest first. Non-admins only see their
/// own store.
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> Result<Json<ApiResponse<Vec<Task>>>> {
    let store_id = claims.scope_store(query.store_id.as_deref())?;

    let mut filters = Vec::new();
    if let Some(id) = &store_id {
        filters.push(Filter::relation("Store", id));
    }
    if let Some(status) = query.status {
        filters.push(Filter::select("Status", status.as_str()));
    }
    if let Some(assignee) = &query.assignee_id {
        filters.push(Filter::relation("Assignee", assignee));
    }

    let query = Query::new()
        .maybe_filter(Filter::all(filters))
        .sort(Sort::newest_first());
    let tasks = record::list(state.records(), &query).await?;

    Ok(Json(ApiResponse::list(tasks)))
}

/// POST /api/tasks - Create a task and notify its assignee.
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Task>>)> {
    claims.require(Role::Manager)?;
    let store_id = required(&req.store_id, "store_id")?;
    claims.require_store(Some(&store_id))?;

    let mut task = Task::new(required(&req.title, "title")?, store_id.as_str());
    task.description = req.description.trim().to_string();
    task.status = req.status.unwrap_or_default();
    task.priority = req.priority.unwrap_or_default();
    task.due_date = req.due_date;
    task.created_by = Some(claims.sub.clone());
    task.assignee_id = req.assignee_id.as_deref().and_then(reference);
    if let Some(assignee) = &task.assignee_id {
        ensure_assignee(state.records(), assignee, &store_id).await?;
    }

    let task = record::insert(state.records(), &task).await?;
    info!(task_id = %task.id, store_id = %store_id, "Task created");

    if let Some(assignee) = &task.assignee_id {
        notify_assignee(state.records(), &claims, assignee, &task).await;
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(task))))
}

/// GET /api/tasks/:id - Get a task.
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Task>>> {
    let task = find_visible(state.records(), &claims, &id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// PATCH /api/tasks/:id - Managers edit anything; staff only move status.
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<Task>>> {
    let mut task = find_visible(state.records(), &claims, &id).await?;
    if claims.role < Role::Manager && req.has_manager_fields() {
        return Err(ApiError::Forbidden("staff may only change status".to_string()));
    }

    let previous_assignee = task.assignee_id.clone();

    if let Some(title) = req.title {
        task.title = required(&title, "title")?;
    }
    if let Some(description) = req.description {
        task.description = description.trim().to_string();
    }
    if let Some(status) = req.status {
        task.status = status;
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if let Some(due) = req.due_date {
        task.due_date = parse_optional_date(&due)?;
    }
    if let Some(assignee) = req.assignee_id {
        task.assignee_id = reference(&assignee);
        if let (Some(assignee), Some(store_id)) = (&task.assignee_id, &task.store_id) {
            ensure_assignee(state.records(), assignee, store_id).await?;
        }
    }

    let task = record::save(state.records(), &id, &task).await?;
    info!(task_id = %id, status = task.status.as_str(), by = %claims.sub, "Task updated");

    if let Some(assignee) = &task.assignee_id {
        if previous_assignee.as_ref() != Some(assignee) {
            notify_assignee(state.records(), &claims, assignee, &task).await;
        }
    }

    Ok(Json(ApiResponse::ok(task)))
}

/// DELETE /api/tasks/:id - Archive a task.
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    claims.require(Role::Manager)?;
    find_visible(state.records(), &claims, &id).await?;
    record::archive(state.records(), &id).await?;
    info!(task_id = %id, "Task archived");
    Ok(Json(ApiResponse::ok(DeletedResponse::new(id))))
}

/// Fetches a task the caller's store can see.
pub(crate) async fn find_visible(store: &dyn RecordStore, claims: &Claims, id: &str) -> Result<Task> {
    let task: Task = record::find(store, id).await?;
    claims.require_store(task.store_id.as_deref())?;
    Ok(task)
}

async fn ensure_assignee(store: &dyn RecordStore, user_id: &str, store_id: &str) -> Result<()> {
    let user = match record::find::<User>(store, user_id).await {
        Ok(user) => user,
        Err(NotionError::NotFound(_)) => {
            return Err(ApiError::BadRequest("unknown assignee".to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if user.role != Role::Admin && user.store_id.as_deref() != Some(store_id) {
        return Err(ApiError::BadRequest(
            "assignee does not belong to this store".to_string(),
        ));
    }
    Ok(())
}

async fn notify_assignee(store: &dyn RecordStore, claims: &Claims, assignee: &str, task: &Task) {
    if claims.is_self(assignee) {
        return;
    }
    let mut notification = Notification::new(
        assignee,
        "New task assigned",
        format!("{} assigned you \"{}\"", claims.name, task.title),
    );
    notification.link = format!("/tasks/{}", task.id);
    notify(store, notification).await;
}

fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("invalid date '{}', expected YYYY-MM-DD", value)))
}
