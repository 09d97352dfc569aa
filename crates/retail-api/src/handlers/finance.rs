//! Financial entry handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use retail_auth::Claims;
use retail_models::{record, FinanceSummary, FinancialEntry, Role};
use retail_notion::{Direction, Filter, Query, Sort};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, AuthUser};
use crate::handlers::required;
use crate::state::AppState;
use crate::types::{
    ApiResponse, CreateEntryRequest, DeletedResponse, FinanceQuery, FinanceSummaryResponse,
    UpdateEntryRequest,
};

/// GET /api/finance - Entries in range, latest date first.
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiQuery(query): ApiQuery<FinanceQuery>,
) -> Result<Json<ApiResponse<Vec<FinancialEntry>>>> {
    let (_, query) = entries_query(&claims, &query)?;
    let entries = record::list(state.records(), &query).await?;
    Ok(Json(ApiResponse::list(entries)))
}

/// POST /api/finance - Record income or an expense.
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FinancialEntry>>)> {
    claims.require(Role::Manager)?;
    let store_id = required(&req.store_id, "store_id")?;
    claims.require_store(Some(&store_id))?;
    check_amount(req.amount)?;

    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let mut entry = FinancialEntry::new(
        &store_id,
        required(&req.description, "description")?,
        req.kind,
        req.amount,
        date,
    );
    entry.category = req.category.trim().to_string();

    let entry = record::insert(state.records(), &entry).await?;
    info!(
        entry_id = %entry.id,
        store_id = %store_id,
        kind = entry.kind.as_str(),
        amount = entry.amount,
        "Financial entry recorded"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}

/// PATCH /api/finance/:id - Correct an entry.
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateEntryRequest>,
) -> Result<Json<ApiResponse<FinancialEntry>>> {
    claims.require(Role::Manager)?;
    let mut entry: FinancialEntry = record::find(state.records(), &id).await?;
    claims.require_store(entry.store_id.as_deref())?;

    if let Some(description) = req.description {
        entry.description = required(&description, "description")?;
    }
    if let Some(amount) = req.amount {
        check_amount(amount)?;
        entry.amount = amount;
    }
    if let Some(kind) = req.kind {
        entry.kind = kind;
    }
    if let Some(category) = req.category {
        entry.category = category.trim().to_string();
    }
    if let Some(date) = req.date {
        entry.date = Some(date);
    }

    let entry = record::save(state.records(), &id, &entry).await?;
    info!(entry_id = %id, by = %claims.sub, "Financial entry updated");
    Ok(Json(ApiResponse::ok(entry)))
}

/// DELETE /api/finance/:id - Archive an entry.
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    claims.require(Role::Admin)?;
    record::find::<FinancialEntry>(state.records(), &id).await?;
    record::archive(state.records(), &id).await?;
    info!(entry_id = %id, "Financial entry archived");
    Ok(Json(ApiResponse::ok(DeletedResponse::new(id))))
}

/// GET /api/finance/summary - Totals over the same filters as the list.
pub async fn finance_summary(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiQuery(query): ApiQuery<FinanceQuery>,
) -> Result<Json<ApiResponse<FinanceSummaryResponse>>> {
    let (store_id, query) = entries_query(&claims, &query)?;
    let entries: Vec<FinancialEntry> = record::list(state.records(), &query).await?;

    Ok(Json(ApiResponse::ok(FinanceSummaryResponse {
        store_id,
        summary: FinanceSummary::from_entries(&entries),
    })))
}

/// Role check, store scoping and date range shared by list and summary.
fn entries_query(claims: &Claims, params: &FinanceQuery) -> Result<(Option<String>, Query)> {
    claims.require(Role::Manager)?;
    let store_id = claims.scope_store(params.store_id.as_deref())?;

    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return Err(ApiError::BadRequest("'from' is after 'to'".to_string()));
        }
    }

    let mut filters = Vec::new();
    if let Some(id) = &store_id {
        filters.push(Filter::relation("Store", id));
    }
    if let Some(from) = params.from {
        filters.push(Filter::on_or_after("Date", from));
    }
    if let Some(to) = params.to {
        filters.push(Filter::on_or_before("Date", to));
    }

    let query = Query::new()
        .maybe_filter(Filter::all(filters))
        .sort(Sort::property("Date", Direction::Descending))
        .sort(Sort::newest_first());
    Ok((store_id, query))
}

fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "amount must be a positive number".to_string(),
        ))
    }
}
