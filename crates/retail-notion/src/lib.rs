//! Notion as a record store.
//!
//! Retail Ops keeps every durable record in a Notion database. This crate
//! provides the pieces needed to treat those databases as a simple store:
//!
//! - [`Page`] and the property readers that project Notion's property JSON
//!   into plain values, falling back to defaults when a property is absent
//! - [`Properties`], a builder for the property JSON sent on create/update
//! - [`Filter`], [`Sort`] and [`Query`] for database queries
//! - the [`RecordStore`] trait with two backends:
//!   - [`NotionClient`]: the Notion REST API over `reqwest`
//!   - [`MemoryStore`]: an in-process store for tests and local development
//!
//! # Example
//!
//! ```no_run
//! use retail_notion::{DatabaseKind, Filter, MemoryStore, Properties, Query, RecordStore};
//!
//! # async fn example() -> retail_notion::Result<()> {
//! let store = MemoryStore::new();
//! store
//!     .create(DatabaseKind::Stores, Properties::new().title("Name", "Downtown"))
//!     .await?;
//!
//! let query = Query::new().filter(Filter::title("Name", "Downtown"));
//! let pages = store.query(DatabaseKind::Stores, &query).await?;
//! assert_eq!(pages.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod memory;
pub mod page;
pub mod properties;
pub mod store;

pub use client::NotionClient;
pub use config::{DatabaseIds, DatabaseKind, NotionConfig, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
pub use error::{NotionError, Result};
pub use filter::{Direction, Filter, Query, Sort};
pub use memory::MemoryStore;
pub use page::Page;
pub use properties::Properties;
pub use store::RecordStore;
