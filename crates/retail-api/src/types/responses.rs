//! Response DTOs for the API.

use serde::Serialize;

use retail_models::{FinanceSummary, User};

/// Success envelope: `{ "success": true, "data": ..., "total"?: n }`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    /// Present on list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            total: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            success: true,
            data: items,
            total: Some(total),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub user: User,
}

/// Result of a bulk update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedResponse {
    pub updated: usize,
}

/// Acknowledges a deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub id: String,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: true,
        }
    }
}

/// Finance summary with the range it covers.
#[derive(Debug, Clone, Serialize)]
pub struct FinanceSummaryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(flatten)]
    pub summary: FinanceSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let single = serde_json::to_value(ApiResponse::ok(json!({ "id": "a" }))).unwrap();
        assert_eq!(single, json!({ "success": true, "data": { "id": "a" } }));

        let list = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(list, json!({ "success": true, "data": [1, 2, 3], "total": 3 }));
    }

    #[test]
    fn test_login_response_hides_password_hash() {
        let user = User::new("Ana", "ana@shop.com", retail_models::Role::Staff, None)
            .with_password_hash("$argon2id$secret");
        let body = serde_json::to_value(LoginResponse {
            token: "t".into(),
            expires_in: 60,
            user,
        })
        .unwrap();
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(body["user"]["email"], "ana@shop.com");
    }
}
