//! The record mapping trait and typed store helpers.

use retail_notion::{DatabaseKind, Page, Properties, Query, RecordStore, Result};

/// A record stored as a row of one Notion database.
pub trait NotionRecord: Sized {
    /// The database holding records of this type.
    const DATABASE: DatabaseKind;

    /// Projects a page into the record. Never fails: absent properties take
    /// their default value.
    fn from_page(page: &Page) -> Self;

    /// Full property payload for this record.
    fn to_properties(&self) -> Properties;
}

/// Fetches one record by page id.
pub async fn find<T: NotionRecord>(store: &dyn RecordStore, id: &str) -> Result<T> {
    let page = store.get(T::DATABASE, id).await?;
    Ok(T::from_page(&page))
}

/// Runs a query and maps every result.
pub async fn list<T: NotionRecord>(store: &dyn RecordStore, query: &Query) -> Result<Vec<T>> {
    let pages = store.query(T::DATABASE, query).await?;
    Ok(pages.iter().map(T::from_page).collect())
}

/// Creates a record and returns it as stored, with its id and timestamp.
pub async fn insert<T: NotionRecord>(store: &dyn RecordStore, record: &T) -> Result<T> {
    let page = store.create(T::DATABASE, record.to_properties()).await?;
    Ok(T::from_page(&page))
}

/// Writes every property of a record back to its page.
pub async fn save<T: NotionRecord>(store: &dyn RecordStore, id: &str, record: &T) -> Result<T> {
    let page = store.update(id, record.to_properties()).await?;
    Ok(T::from_page(&page))
}

/// Archives a record.
pub async fn archive(store: &dyn RecordStore, id: &str) -> Result<()> {
    store.archive(id).await
}
