//! Builder for Notion property payloads.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Notion rejects rich text objects longer than this many characters.
pub const MAX_TEXT_CHUNK: usize = 2000;

/// Property values for a create or update call.
///
/// Values are written in the same envelope shape the [`Page`](crate::Page)
/// readers understand, so a page built from these properties reads back
/// the values that went in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(Map<String, Value>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(self, name: &str, value: &str) -> Self {
        self.set(name, json!({ "title": rich_text(value) }))
    }

    pub fn text(self, name: &str, value: &str) -> Self {
        self.set(name, json!({ "rich_text": rich_text(value) }))
    }

    pub fn number(self, name: &str, value: f64) -> Self {
        self.set(name, json!({ "number": value }))
    }

    pub fn checkbox(self, name: &str, value: bool) -> Self {
        self.set(name, json!({ "checkbox": value }))
    }

    /// A `select` value. An empty name clears the selection.
    pub fn select(self, name: &str, value: &str) -> Self {
        let select = if value.is_empty() {
            Value::Null
        } else {
            json!({ "name": value })
        };
        self.set(name, json!({ "select": select }))
    }

    /// A `date` value. `None` clears the date.
    pub fn date(self, name: &str, value: Option<NaiveDate>) -> Self {
        let date = match value {
            Some(day) => json!({ "start": day.format("%Y-%m-%d").to_string() }),
            None => Value::Null,
        };
        self.set(name, json!({ "date": date }))
    }

    pub fn email(self, name: &str, value: &str) -> Self {
        self.set(name, json!({ "email": null_if_empty(value) }))
    }

    pub fn phone(self, name: &str, value: &str) -> Self {
        self.set(name, json!({ "phone_number": null_if_empty(value) }))
    }

    /// A single-page relation. `None` clears it.
    pub fn relation(self, name: &str, page_id: Option<&str>) -> Self {
        self.relations(name, page_id.into_iter())
    }

    pub fn relations<'a>(self, name: &str, page_ids: impl Iterator<Item = &'a str>) -> Self {
        let ids: Vec<Value> = page_ids.map(|id| json!({ "id": id })).collect();
        self.set(name, json!({ "relation": ids }))
    }

    /// Sets a raw property envelope.
    pub fn set(mut self, name: &str, value: Value) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }

    /// Adds every property of `other`, overwriting on conflict.
    pub fn merge(mut self, other: Properties) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

fn null_if_empty(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

/// Splits text into rich text objects of at most [`MAX_TEXT_CHUNK`] chars.
fn rich_text(value: &str) -> Value {
    let chars: Vec<char> = value.chars().collect();
    let chunks: Vec<Value> = chars
        .chunks(MAX_TEXT_CHUNK)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": content } })
        })
        .collect();
    Value::Array(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_shapes() {
        let props = Properties::new()
            .title("Name", "Downtown")
            .number("Amount", 3.5)
            .checkbox("Active", true)
            .select("Role", "admin")
            .date("Due", NaiveDate::from_ymd_opt(2024, 1, 31))
            .email("Email", "")
            .relation("Store", Some("s-1"));

        let map = props.into_map();
        assert_eq!(map["Name"]["title"][0]["text"]["content"], "Downtown");
        assert_eq!(map["Amount"]["number"], 3.5);
        assert_eq!(map["Active"]["checkbox"], true);
        assert_eq!(map["Role"]["select"]["name"], "admin");
        assert_eq!(map["Due"]["date"]["start"], "2024-01-31");
        assert!(map["Email"]["email"].is_null());
        assert_eq!(map["Store"]["relation"][0]["id"], "s-1");
    }

    #[test]
    fn test_clearing_values() {
        let map = Properties::new()
            .select("Role", "")
            .date("Due", None)
            .relation("Store", None)
            .into_map();
        assert!(map["Role"]["select"].is_null());
        assert!(map["Due"]["date"].is_null());
        assert_eq!(map["Store"]["relation"], json!([]));
    }

    #[test]
    fn test_long_text_is_chunked() {
        let long = "é".repeat(MAX_TEXT_CHUNK + 10);
        let map = Properties::new().text("Body", &long).into_map();
        let chunks = map["Body"]["rich_text"].as_array().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[1]["text"]["content"].as_str().unwrap().chars().count(),
            10
        );
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let map = Properties::new().text("Body", "").into_map();
        assert_eq!(map["Body"]["rich_text"], json!([]));
    }

    #[test]
    fn test_merge_overwrites() {
        let merged = Properties::new()
            .title("Name", "a")
            .checkbox("Active", false)
            .merge(Properties::new().checkbox("Active", true));
        assert_eq!(merged.len(), 2);
        assert!(merged.contains("Name"));
        assert_eq!(merged.into_map()["Active"]["checkbox"], true);
    }
}
