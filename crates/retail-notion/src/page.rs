//! Notion page objects and property readers.
//!
//! Notion wraps every property value in a typed envelope, e.g. a title is
//! `{"title": [{"plain_text": "Downtown", ...}]}`. The readers on [`Page`]
//! unwrap those envelopes. A property that is absent or of an unexpected
//! shape reads as the type's default (empty string, `0`, `false`, `None`,
//! empty list); records never fail to load because a column was renamed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The parent reference of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
}

/// A Notion page (a database row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub parent: Parent,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Raw property envelope.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Concatenated text of a `title` property.
    pub fn title(&self, name: &str) -> String {
        self.property(name)
            .and_then(|p| p.get("title"))
            .map(join_rich_text)
            .unwrap_or_default()
    }

    /// Concatenated text of a `rich_text` property.
    pub fn text(&self, name: &str) -> String {
        self.property(name)
            .and_then(|p| p.get("rich_text"))
            .map(join_rich_text)
            .unwrap_or_default()
    }

    pub fn number(&self, name: &str) -> f64 {
        self.property(name)
            .and_then(|p| p.get("number"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    pub fn checkbox(&self, name: &str) -> bool {
        self.property(name)
            .and_then(|p| p.get("checkbox"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Name of the selected option of a `select` property.
    pub fn select(&self, name: &str) -> Option<String> {
        self.property(name)
            .and_then(|p| p.get("select"))
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Start date of a `date` property. Datetimes are truncated to the day.
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.property(name)
            .and_then(|p| p.get("date"))
            .and_then(|d| d.get("start"))
            .and_then(Value::as_str)
            .and_then(parse_date)
    }

    pub fn email(&self, name: &str) -> String {
        self.plain_string(name, "email")
    }

    pub fn phone(&self, name: &str) -> String {
        self.plain_string(name, "phone_number")
    }

    /// First page id of a `relation` property.
    pub fn relation(&self, name: &str) -> Option<String> {
        self.relation_ids(name).into_iter().next()
    }

    /// All page ids of a `relation` property.
    pub fn relation_ids(&self, name: &str) -> Vec<String> {
        self.property(name)
            .and_then(|p| p.get("relation"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn plain_string(&self, name: &str, key: &str) -> String {
        self.property(name)
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// Joins a rich text array. Prefers `plain_text`, which Notion fills on
/// reads, and falls back to `text.content`, which is what we write.
fn join_rich_text(value: &Value) -> String {
    let Some(items) = value.as_array() else {
        return String::new();
    };
    items
        .iter()
        .filter_map(|item| {
            item.get("plain_text")
                .and_then(Value::as_str)
                .or_else(|| {
                    item.get("text")
                        .and_then(|t| t.get("content"))
                        .and_then(Value::as_str)
                })
        })
        .collect()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
