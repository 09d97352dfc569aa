//! Store (shop location) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retail_notion::{DatabaseKind, Page, Properties};

use crate::record::NotionRecord;

/// A physical store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    /// Short internal code, e.g. `DT-01`.
    pub code: String,
    pub address: String,
    pub phone: String,
    /// Free-text manager name shown on the dashboard.
    pub manager: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            code: code.into(),
            address: String::new(),
            phone: String::new(),
            manager: String::new(),
            active: true,
            created_at: Utc::now(),
        }
    }
}

impl NotionRecord for Store {
    const DATABASE: DatabaseKind = DatabaseKind::Stores;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            name: page.title("Name"),
            code: page.text("Code"),
            address: page.text("Address"),
            phone: page.phone("Phone"),
            manager: page.text("Manager"),
            active: page.checkbox("Active"),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        Properties::new()
            .title("Name", &self.name)
            .text("Code", &self.code)
            .text("Address", &self.address)
            .phone("Phone", &self.phone)
            .text("Manager", &self.manager)
            .checkbox("Active", self.active)
    }
}
