//! API request handlers.

pub mod auth;
pub mod comments;
pub mod finance;
pub mod forms;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod stores;
pub mod tasks;
pub mod users;

pub use auth::*;
pub use comments::*;
pub use finance::*;
pub use forms::*;
pub use health::*;
pub use messages::*;
pub use notifications::*;
pub use stores::*;
pub use tasks::*;
pub use users::*;

use retail_models::validate::non_blank;

use crate::error::{ApiError, Result};

/// Trimmed value of a required text field.
pub(crate) fn required(value: &str, field: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

/// Optional reference from an update request: blank clears it.
pub(crate) fn reference(value: &str) -> Option<String> {
    non_blank(value)
}
