//! RecordStore trait definition.

use async_trait::async_trait;

use crate::config::DatabaseKind;
use crate::error::Result;
use crate::filter::Query;
use crate::page::Page;
use crate::properties::Properties;

/// A set of Notion-shaped databases.
///
/// Implementations must treat archived pages as deleted: they never come
/// back from `query` or `get`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Runs a query against one database, following pagination until the
    /// results are exhausted or `query.limit` is reached.
    async fn query(&self, database: DatabaseKind, query: &Query) -> Result<Vec<Page>>;

    /// Fetches a page that belongs to `database`.
    ///
    /// Returns `NotFound` when the page is missing, archived, or lives in a
    /// different database.
    async fn get(&self, database: DatabaseKind, id: &str) -> Result<Page>;

    /// Creates a page in `database`.
    async fn create(&self, database: DatabaseKind, properties: Properties) -> Result<Page>;

    /// Updates the given properties of a page, leaving the rest untouched.
    async fn update(&self, id: &str, properties: Properties) -> Result<Page>;

    /// Archives a page. Notion has no hard delete for API integrations.
    async fn archive(&self, id: &str) -> Result<()>;
}
