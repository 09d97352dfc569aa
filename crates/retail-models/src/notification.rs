//! User notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retail_notion::{DatabaseKind, Page, Properties};

use crate::record::NotionRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: Option<String>,
    pub title: String,
    pub body: String,
    /// Optional in-app route, e.g. `/tasks/<id>`.
    pub link: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: &str, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            user_id: Some(user_id.to_string()),
            title: title.into(),
            body: body.into(),
            link: String::new(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

impl NotionRecord for Notification {
    const DATABASE: DatabaseKind = DatabaseKind::Notifications;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            user_id: page.relation("User"),
            title: page.title("Title"),
            body: page.text("Body"),
            link: page.text("Link"),
            read: page.checkbox("Read"),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        Properties::new()
            .title("Title", &self.title)
            .text("Body", &self.body)
            .relation("User", self.user_id.as_deref())
            .text("Link", &self.link)
            .checkbox("Read", self.read)
    }
}
