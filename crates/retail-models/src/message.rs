//! Store chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retail_notion::{DatabaseKind, Page, Properties};

use crate::record::NotionRecord;

/// A message posted to a store's channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub store_id: Option<String>,
    pub sender_id: Option<String>,
    /// Denormalized so the channel renders without a user lookup per line.
    pub sender_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        store_id: &str,
        sender_id: &str,
        sender_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            store_id: Some(store_id.to_string()),
            sender_id: Some(sender_id.to_string()),
            sender_name: sender_name.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

impl NotionRecord for Message {
    const DATABASE: DatabaseKind = DatabaseKind::Messages;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            store_id: page.relation("Store"),
            sender_id: page.relation("Sender"),
            sender_name: page.text("Sender Name"),
            body: page.title("Body"),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        Properties::new()
            .title("Body", &self.body)
            .relation("Store", self.store_id.as_deref())
            .relation("Sender", self.sender_id.as_deref())
            .text("Sender Name", &self.sender_name)
    }
}
