//! In-process record store for development and testing.
//!
//! Pages are kept in insertion order and queries are answered with the
//! local [`Query::apply`] evaluation. Nothing is persisted.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::config::DatabaseKind;
use crate::error::{NotionError, Result};
use crate::filter::Query;
use crate::page::{Page, Parent};
use crate::properties::Properties;
use crate::store::RecordStore;

#[derive(Default)]
struct Inner {
    pages: Vec<(DatabaseKind, Page)>,
    index: HashMap<String, usize>,
    last_created: Option<DateTime<Utc>>,
}

impl Inner {
    /// Creation timestamps are kept strictly increasing so that sorting by
    /// creation time is deterministic even within one clock tick.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_created = Some(ts);
        ts
    }

    fn live_mut(&mut self, id: &str) -> Result<&mut Page> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| NotionError::NotFound(id.to_string()))?;
        let (_, page) = &mut self.pages[idx];
        if page.archived {
            return Err(NotionError::NotFound(id.to_string()));
        }
        Ok(page)
    }
}

/// In-memory [`RecordStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live pages in a database.
    pub async fn count(&self, database: DatabaseKind) -> usize {
        let inner = self.inner.read().await;
        inner
            .pages
            .iter()
            .filter(|(db, page)| *db == database && !page.archived)
            .count()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query(&self, database: DatabaseKind, query: &Query) -> Result<Vec<Page>> {
        let inner = self.inner.read().await;
        let candidates = inner
            .pages
            .iter()
            .filter(|(db, page)| *db == database && !page.archived)
            .map(|(_, page)| page.clone());
        let results = query.apply(candidates);
        debug!(database = %database, count = results.len(), "Memory query");
        Ok(results)
    }

    async fn get(&self, database: DatabaseKind, id: &str) -> Result<Page> {
        let inner = self.inner.read().await;
        inner
            .index
            .get(id)
            .map(|idx| &inner.pages[*idx])
            .filter(|(db, page)| *db == database && !page.archived)
            .map(|(_, page)| page.clone())
            .ok_or_else(|| NotionError::NotFound(id.to_string()))
    }

    async fn create(&self, database: DatabaseKind, properties: Properties) -> Result<Page> {
        let mut inner = self.inner.write().await;
        let created = inner.next_timestamp();
        let page = Page {
            id: Uuid::new_v4().to_string(),
            created_time: created,
            last_edited_time: created,
            archived: false,
            parent: Parent {
                database_id: Some(database.as_str().to_string()),
            },
            properties: properties.into_map(),
        };

        let idx = inner.pages.len();
        inner.index.insert(page.id.clone(), idx);
        inner.pages.push((database, page.clone()));
        Ok(page)
    }

    async fn update(&self, id: &str, properties: Properties) -> Result<Page> {
        let mut inner = self.inner.write().await;
        let page = inner.live_mut(id)?;
        page.properties.extend(properties.into_map());
        page.last_edited_time = Utc::now().max(page.created_time);
        Ok(page.clone())
    }

    async fn archive(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let page = inner.live_mut(id)?;
        page.archived = true;
        Ok(())
    }
}
