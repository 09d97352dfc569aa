//! Form and submission handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use retail_auth::Claims;
use retail_models::{record, Form, FormSubmission, Role};
use retail_notion::{Direction, Filter, Query, Sort};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, AuthUser};
use crate::handlers::{reference, required};
use crate::state::AppState;
use crate::types::{
    ApiResponse, CreateFormRequest, DeletedResponse, SubmissionListQuery, SubmitFormRequest,
    UpdateFormRequest,
};

/// GET /api/forms - Admins see every form; others the active forms for
/// their store.
pub async fn list_forms(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<Form>>>> {
    let sort = Sort::property("Title", Direction::Ascending);

    let forms = if claims.is_admin() {
        record::list(state.records(), &Query::new().sort(sort)).await?
    } else {
        let query = Query::new().filter(Filter::checkbox("Active", true)).sort(sort);
        record::list::<Form>(state.records(), &query)
            .await?
            .into_iter()
            .filter(|f| f.applies_to(claims.store_id.as_deref()))
            .collect()
    };

    Ok(Json(ApiResponse::list(forms)))
}

/// POST /api/forms - Create a form.
pub async fn create_form(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateFormRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Form>>)> {
    claims.require(Role::Admin)?;
    Form::validate_fields(&req.fields).map_err(ApiError::BadRequest)?;

    let mut form = Form::new(required(&req.title, "title")?, req.fields);
    form.description = req.description.trim().to_string();
    form.store_id = req.store_id.as_deref().and_then(reference);

    let form = record::insert(state.records(), &form).await?;
    info!(form_id = %form.id, fields = form.fields.len(), "Form created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(form))))
}

/// GET /api/forms/:id - Get a form visible to the caller.
pub async fn get_form(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Form>>> {
    let form: Form = record::find(state.records(), &id).await?;
    require_visible(&claims, &form)?;
    Ok(Json(ApiResponse::ok(form)))
}

/// PATCH /api/forms/:id - Update a form.
pub async fn update_form(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateFormRequest>,
) -> Result<Json<ApiResponse<Form>>> {
    claims.require(Role::Admin)?;
    let mut form: Form = record::find(state.records(), &id).await?;

    if let Some(title) = req.title {
        form.title = required(&title, "title")?;
    }
    if let Some(description) = req.description {
        form.description = description.trim().to_string();
    }
    if let Some(fields) = req.fields {
        Form::validate_fields(&fields).map_err(ApiError::BadRequest)?;
        form.fields = fields;
    }
    if let Some(store_id) = req.store_id {
        form.store_id = reference(&store_id);
    }
    if let Some(active) = req.active {
        form.active = active;
    }

    let form = record::save(state.records(), &id, &form).await?;
    info!(form_id = %id, "Form updated");
    Ok(Json(ApiResponse::ok(form)))
}

/// DELETE /api/forms/:id - Archive a form.
pub async fn delete_form(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    claims.require(Role::Admin)?;
    record::find::<Form>(state.records(), &id).await?;
    record::archive(state.records(), &id).await?;
    info!(form_id = %id, "Form archived");
    Ok(Json(ApiResponse::ok(DeletedResponse::new(id))))
}

/// GET /api/forms/:id/submissions - Submissions for a form, newest first.
pub async fn list_submissions(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<SubmissionListQuery>,
) -> Result<Json<ApiResponse<Vec<FormSubmission>>>> {
    claims.require(Role::Manager)?;
    let store_id = claims.scope_store(query.store_id.as_deref())?;
    record::find::<Form>(state.records(), &id).await?;

    let mut filters = vec![Filter::relation("Form", &id)];
    if let Some(store_id) = &store_id {
        filters.push(Filter::relation("Store", store_id));
    }
    let query = Query::new()
        .maybe_filter(Filter::all(filters))
        .sort(Sort::newest_first());
    let submissions = record::list(state.records(), &query).await?;

    Ok(Json(ApiResponse::list(submissions)))
}

/// POST /api/forms/:id/submissions - Submit answers for the caller's store.
pub async fn submit_form(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SubmitFormRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FormSubmission>>)> {
    let store_id = claims
        .scope_store(req.store_id.as_deref())?
        .ok_or_else(|| ApiError::BadRequest("store_id is required".to_string()))?;

    let form: Form = record::find(state.records(), &id).await?;
    if !form.active {
        return Err(ApiError::BadRequest("form is not active".to_string()));
    }
    if !form.applies_to(Some(&store_id)) {
        return Err(ApiError::Forbidden("form does not apply to this store".to_string()));
    }
    form.validate_answers(&req.answers).map_err(ApiError::BadRequest)?;

    let submission = FormSubmission::new(&form, &store_id, &claims.sub, req.answers);
    let submission = record::insert(state.records(), &submission).await?;
    info!(form_id = %id, store_id = %store_id, submission_id = %submission.id, "Form submitted");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(submission))))
}

/// Hidden forms look the same as missing ones.
fn require_visible(claims: &Claims, form: &Form) -> Result<()> {
    if claims.is_admin() || (form.active && form.applies_to(claims.store_id.as_deref())) {
        Ok(())
    } else {
        Err(ApiError::NotFound("record not found".to_string()))
    }
}
