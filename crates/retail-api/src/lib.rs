//! REST API for Retail Ops.
//!
//! Serves the admin dashboard and the store app:
//! - Authentication (login, current user)
//! - Stores and users
//! - Tasks and task comments
//! - Checklist forms and submissions
//! - Notifications and store messages
//! - Financial entries and summaries
//!
//! Every record lives in Notion; handlers go through a
//! [`RecordStore`](retail_notion::RecordStore) held in [`AppState`].
//! Successful replies use `{ "success": true, "data": ... }`, errors use
//! `{ "success": false, "error": "..." }`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use retail_api::{serve, AppState, ServerConfig};
//! use retail_notion::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default().with_jwt_secret("change-me-change-me-change-me-32b");
//!     let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{RateLimitConfig, ServerConfig};
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
