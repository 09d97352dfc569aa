//! Store message channel handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use retail_models::{record, Message};
use retail_notion::{Filter, Query, Sort};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, AuthUser};
use crate::handlers::required;
use crate::state::AppState;
use crate::types::{ApiResponse, MessageListQuery, PostMessageRequest};

pub const DEFAULT_MESSAGE_LIMIT: usize = 50;
pub const MAX_MESSAGE_LIMIT: usize = 200;
pub const MAX_MESSAGE_LEN: usize = 2000;

/// GET /api/stores/:id/messages - The newest messages, oldest first.
pub async fn list_messages(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(store_id): Path<String>,
    ApiQuery(query): ApiQuery<MessageListQuery>,
) -> Result<Json<ApiResponse<Vec<Message>>>> {
    claims.require_store(Some(&store_id))?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_MESSAGE_LIMIT)
        .clamp(1, MAX_MESSAGE_LIMIT);

    let query = Query::new()
        .filter(Filter::relation("Store", &store_id))
        .sort(Sort::newest_first())
        .limit(limit);
    let mut messages: Vec<Message> = record::list(state.records(), &query).await?;
    messages.reverse();

    Ok(Json(ApiResponse::list(messages)))
}

/// POST /api/stores/:id/messages - Post to a store's channel.
pub async fn post_message(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(store_id): Path<String>,
    ApiJson(req): ApiJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>)> {
    claims.require_store(Some(&store_id))?;
    let body = required(&req.body, "body")?;
    if body.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::BadRequest(format!(
            "message exceeds {} characters",
            MAX_MESSAGE_LEN
        )));
    }

    let message = Message::new(&store_id, &claims.sub, claims.name.as_str(), body);
    let message = record::insert(state.records(), &message).await?;
    debug!(store_id = %store_id, sender = %claims.sub, "Message posted");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}
