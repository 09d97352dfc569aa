//! Store handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use retail_models::{record, Role, Store};
use retail_notion::{Direction, Filter, NotionError, Query, Sort};

use crate::error::Result;
use crate::extract::{ApiJson, ApiQuery, AuthUser};
use crate::handlers::required;
use crate::state::AppState;
use crate::types::{
    ApiResponse, CreateStoreRequest, DeletedResponse, StoreListQuery, UpdateStoreRequest,
};

/// GET /api/stores - Admins see every store, everyone else their own.
pub async fn list_stores(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiQuery(query): ApiQuery<StoreListQuery>,
) -> Result<Json<ApiResponse<Vec<Store>>>> {
    let stores = if claims.is_admin() {
        let query = Query::new()
            .maybe_filter(query.active.map(|a| Filter::checkbox("Active", a)))
            .sort(Sort::property("Name", Direction::Ascending));
        record::list(state.records(), &query).await?
    } else {
        let Some(own) = claims.store_id.as_deref() else {
            return Ok(Json(ApiResponse::list(Vec::new())));
        };
        match record::find::<Store>(state.records(), own).await {
            Ok(store) if query.active.map_or(true, |a| a == store.active) => vec![store],
            Ok(_) | Err(NotionError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        }
    };

    Ok(Json(ApiResponse::list(stores)))
}

/// POST /api/stores - Create a store.
pub async fn create_store(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Store>>)> {
    claims.require(Role::Admin)?;

    let mut store = Store::new(required(&req.name, "name")?, req.code.trim());
    store.address = req.address.trim().to_string();
    store.phone = req.phone.trim().to_string();
    store.manager = req.manager.trim().to_string();

    let store = record::insert(state.records(), &store).await?;
    info!(store_id = %store.id, name = %store.name, "Store created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(store))))
}

/// GET /api/stores/:id - Get a store.
pub async fn get_store(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Store>>> {
    claims.require_store(Some(&id))?;
    let store: Store = record::find(state.records(), &id).await?;
    Ok(Json(ApiResponse::ok(store)))
}

/// PATCH /api/stores/:id - Update a store.
pub async fn update_store(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStoreRequest>,
) -> Result<Json<ApiResponse<Store>>> {
    claims.require(Role::Admin)?;
    let mut store: Store = record::find(state.records(), &id).await?;

    if let Some(name) = req.name {
        store.name = required(&name, "name")?;
    }
    if let Some(code) = req.code {
        store.code = code.trim().to_string();
    }
    if let Some(address) = req.address {
        store.address = address.trim().to_string();
    }
    if let Some(phone) = req.phone {
        store.phone = phone.trim().to_string();
    }
    if let Some(manager) = req.manager {
        store.manager = manager.trim().to_string();
    }
    if let Some(active) = req.active {
        store.active = active;
    }

    let store = record::save(state.records(), &id, &store).await?;
    info!(store_id = %id, "Store updated");
    Ok(Json(ApiResponse::ok(store)))
}

/// DELETE /api/stores/:id - Archive a store.
pub async fn delete_store(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    claims.require(Role::Admin)?;
    record::find::<Store>(state.records(), &id).await?;
    record::archive(state.records(), &id).await?;
    info!(store_id = %id, "Store archived");
    Ok(Json(ApiResponse::ok(DeletedResponse::new(id))))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::test_support::Fixture;

    #[tokio::test]
    async fn test_admin_lists_all_stores() {
        let fx = Fixture::new().await;

        let (name, value) = fx.auth(&fx.admin);
        let response = fx.server.get("/api/stores").add_header(name, value).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][0]["name"], "Harbor");
        assert_eq!(body["data"][1]["name"], "Uptown");
    }

    #[tokio::test]
    async fn test_staff_lists_own_store_only() {
        let fx = Fixture::new().await;

        let (name, value) = fx.auth(&fx.staff_b);
        let response = fx.server.get("/api/stores").add_header(name, value).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["id"], fx.store_b.id.as_str());
    }

    #[tokio::test]
    async fn test_active_filter() {
        let fx = Fixture::new().await;

        let (name, value) = fx.auth(&fx.admin);
        fx.server
            .patch(&format!("/api/stores/{}", fx.store_b.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "active": false }))
            .await
            .assert_status_ok();

        let response = fx
            .server
            .get("/api/stores?active=true")
            .add_header(name, value)
            .await;
        let body: Value = response.json();
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["id"], fx.store_a.id.as_str());
    }

    #[tokio::test]
    async fn test_create_store_requires_admin() {
        let fx = Fixture::new().await;
        let new_store = json!({ "name": "Airport", "code": "AP-03" });

        let (name, value) = fx.auth(&fx.manager_a);
        fx.server
            .post("/api/stores")
            .add_header(name, value)
            .json(&new_store)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let (name, value) = fx.auth(&fx.admin);
        let response = fx
            .server
            .post("/api/stores")
            .add_header(name, value)
            .json(&new_store)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["code"], "AP-03");
        assert_eq!(body["data"]["active"], true);
    }

    #[tokio::test]
    async fn test_create_store_requires_name() {
        let fx = Fixture::new().await;

        let (name, value) = fx.auth(&fx.admin);
        let response = fx
            .server
            .post("/api/stores")
            .add_header(name, value)
            .json(&json!({ "name": "  " }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_store_checks_access() {
        let fx = Fixture::new().await;

        let (name, value) = fx.auth(&fx.staff_a);
        fx.server
            .get(&format!("/api/stores/{}", fx.store_a.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status_ok();
        fx.server
            .get(&format!("/api/stores/{}", fx.store_b.id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete_store() {
        let fx = Fixture::new().await;

        let (name, value) = fx.auth(&fx.admin);
        let path = format!("/api/stores/{}", fx.store_b.id);
        let response = fx
            .server
            .delete(&path)
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["deleted"], true);

        fx.server
            .get(&path)
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
