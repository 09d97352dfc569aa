//! Task comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retail_notion::{DatabaseKind, Page, Properties};

use crate::record::NotionRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub task_id: Option<String>,
    pub author_id: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(task_id: &str, author_id: &str, body: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            task_id: Some(task_id.to_string()),
            author_id: Some(author_id.to_string()),
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

impl NotionRecord for Comment {
    const DATABASE: DatabaseKind = DatabaseKind::Comments;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            task_id: page.relation("Task"),
            author_id: page.relation("Author"),
            body: page.title("Body"),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        Properties::new()
            .title("Body", &self.body)
            .relation("Task", self.task_id.as_deref())
            .relation("Author", self.author_id.as_deref())
    }
}
