//! Task comment handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use retail_models::{record, Comment};
use retail_notion::{Filter, Query, Sort};

use crate::error::Result;
use crate::extract::{ApiJson, AuthUser};
use crate::handlers::required;
use crate::handlers::tasks::find_visible;
use crate::state::AppState;
use crate::types::{ApiResponse, CreateCommentRequest};

/// GET /api/tasks/:id/comments - Comments on a task, oldest first.
pub async fn list_comments(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(task_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Comment>>>> {
    find_visible(state.records(), &claims, &task_id).await?;

    let query = Query::new()
        .filter(Filter::relation("Task", &task_id))
        .sort(Sort::oldest_first());
    let comments = record::list(state.records(), &query).await?;

    Ok(Json(ApiResponse::list(comments)))
}

/// POST /api/tasks/:id/comments - Comment on a task.
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(task_id): Path<String>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>)> {
    let body = required(&req.body, "body")?;
    find_visible(state.records(), &claims, &task_id).await?;

    let comment = record::insert(state.records(), &Comment::new(&task_id, &claims.sub, body)).await?;
    info!(task_id = %task_id, comment_id = %comment.id, "Comment added");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}
