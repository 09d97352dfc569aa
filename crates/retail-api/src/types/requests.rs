//! Request DTOs for the API.
//!
//! Update requests are partial: absent fields are left unchanged. For
//! optional references (assignee, due date, store) an empty string clears
//! the value.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

use retail_models::{EntryKind, FormField, Role, TaskPriority, TaskStatus};

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create store request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub manager: String,
}

/// Update store request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
    pub active: Option<bool>,
}

/// Create user request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub store_id: Option<String>,
}

/// Update user request. Non-admins may only change their own name and
/// password.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub store_id: Option<String>,
    pub active: Option<bool>,
}

impl UpdateUserRequest {
    /// Whether the request touches anything besides name and password.
    pub fn has_admin_fields(&self) -> bool {
        self.email.is_some() || self.role.is_some() || self.store_id.is_some() || self.active.is_some()
    }
}

/// Create task request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub store_id: String,
    #[serde(default)]
    pub description: String,
    pub assignee_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

/// Update task request. Staff may only send `status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<String>,
}

impl UpdateTaskRequest {
    /// Whether the request touches anything besides status.
    pub fn has_manager_fields(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.assignee_id.is_some()
            || self.priority.is_some()
            || self.due_date.is_some()
    }
}

/// Create comment request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

/// Create form request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFormRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    pub store_id: Option<String>,
}

/// Update form request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFormRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<FormField>>,
    pub store_id: Option<String>,
    pub active: Option<bool>,
}

/// Submit form request. Admins without a store must name one.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitFormRequest {
    #[serde(default)]
    pub answers: Map<String, Value>,
    pub store_id: Option<String>,
}

/// Create notification request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub link: String,
}

/// Post store message request.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

/// Create financial entry request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryRequest {
    pub store_id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub kind: EntryKind,
    #[serde(default)]
    pub category: String,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

/// Update financial entry request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntryRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<EntryKind>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Store list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreListQuery {
    pub active: Option<bool>,
}

/// User list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub store_id: Option<String>,
}

/// Task list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    pub store_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<String>,
}

/// Form submission list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionListQuery {
    pub store_id: Option<String>,
}

/// Notification list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
    pub unread: Option<bool>,
}

/// Message list query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageListQuery {
    /// Keep only the newest `limit` messages.
    pub limit: Option<usize>,
}

/// Finance list and summary query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinanceQuery {
    pub store_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
