//! Database query model.
//!
//! [`Filter`] and [`Sort`] serialize to Notion's query JSON and can also be
//! evaluated locally against a [`Page`], which is how the in-memory store
//! answers queries.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::page::Page;

/// A database filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Title { property: String, equals: String },
    Text { property: String, equals: String },
    Email { property: String, equals: String },
    Select { property: String, equals: String },
    Checkbox { property: String, equals: bool },
    Relation { property: String, contains: String },
    DateOnOrAfter { property: String, date: NaiveDate },
    DateOnOrBefore { property: String, date: NaiveDate },
    And(Vec<Filter>),
}

impl Filter {
    pub fn title(property: &str, equals: &str) -> Self {
        Filter::Title {
            property: property.to_string(),
            equals: equals.to_string(),
        }
    }

    pub fn text(property: &str, equals: &str) -> Self {
        Filter::Text {
            property: property.to_string(),
            equals: equals.to_string(),
        }
    }

    pub fn email(property: &str, equals: &str) -> Self {
        Filter::Email {
            property: property.to_string(),
            equals: equals.to_string(),
        }
    }

    pub fn select(property: &str, equals: &str) -> Self {
        Filter::Select {
            property: property.to_string(),
            equals: equals.to_string(),
        }
    }

    pub fn checkbox(property: &str, equals: bool) -> Self {
        Filter::Checkbox {
            property: property.to_string(),
            equals,
        }
    }

    pub fn relation(property: &str, page_id: &str) -> Self {
        Filter::Relation {
            property: property.to_string(),
            contains: page_id.to_string(),
        }
    }

    pub fn on_or_after(property: &str, date: NaiveDate) -> Self {
        Filter::DateOnOrAfter {
            property: property.to_string(),
            date,
        }
    }

    pub fn on_or_before(property: &str, date: NaiveDate) -> Self {
        Filter::DateOnOrBefore {
            property: property.to_string(),
            date,
        }
    }

    /// Combines filters. Returns `None` for an empty list and unwraps a
    /// single filter, since Notion rejects `and` compounds with fewer than
    /// two members in some API versions.
    pub fn all(mut filters: Vec<Filter>) -> Option<Filter> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::And(filters)),
        }
    }

    /// Notion filter object.
    pub fn to_json(&self) -> Value {
        match self {
            Filter::Title { property, equals } => {
                json!({ "property": property, "title": { "equals": equals } })
            }
            Filter::Text { property, equals } => {
                json!({ "property": property, "rich_text": { "equals": equals } })
            }
            Filter::Email { property, equals } => {
                json!({ "property": property, "email": { "equals": equals } })
            }
            Filter::Select { property, equals } => {
                json!({ "property": property, "select": { "equals": equals } })
            }
            Filter::Checkbox { property, equals } => {
                json!({ "property": property, "checkbox": { "equals": equals } })
            }
            Filter::Relation { property, contains } => {
                json!({ "property": property, "relation": { "contains": contains } })
            }
            Filter::DateOnOrAfter { property, date } => json!({
                "property": property,
                "date": { "on_or_after": date.format("%Y-%m-%d").to_string() }
            }),
            Filter::DateOnOrBefore { property, date } => json!({
                "property": property,
                "date": { "on_or_before": date.format("%Y-%m-%d").to_string() }
            }),
            Filter::And(filters) => {
                json!({ "and": filters.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
        }
    }

    /// Evaluates the filter against a page locally.
    pub fn matches(&self, page: &Page) -> bool {
        match self {
            Filter::Title { property, equals } => page.title(property) == *equals,
            Filter::Text { property, equals } => page.text(property) == *equals,
            Filter::Email { property, equals } => page.email(property) == *equals,
            Filter::Select { property, equals } => {
                page.select(property).as_deref() == Some(equals.as_str())
            }
            Filter::Checkbox { property, equals } => page.checkbox(property) == *equals,
            Filter::Relation { property, contains } => {
                page.relation_ids(property).iter().any(|id| id == contains)
            }
            Filter::DateOnOrAfter { property, date } => {
                page.date(property).is_some_and(|d| d >= *date)
            }
            Filter::DateOnOrBefore { property, date } => {
                page.date(property).is_some_and(|d| d <= *date)
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(page)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// A sort criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum Sort {
    CreatedTime(Direction),
    Property(String, Direction),
}

impl Sort {
    pub fn oldest_first() -> Self {
        Sort::CreatedTime(Direction::Ascending)
    }

    pub fn newest_first() -> Self {
        Sort::CreatedTime(Direction::Descending)
    }

    pub fn property(name: &str, direction: Direction) -> Self {
        Sort::Property(name.to_string(), direction)
    }

    /// Notion sort object.
    pub fn to_json(&self) -> Value {
        match self {
            Sort::CreatedTime(direction) => {
                json!({ "timestamp": "created_time", "direction": direction.as_str() })
            }
            Sort::Property(name, direction) => {
                json!({ "property": name, "direction": direction.as_str() })
            }
        }
    }

    /// Compares two pages locally.
    pub fn compare(&self, a: &Page, b: &Page) -> Ordering {
        match self {
            Sort::CreatedTime(direction) => direction.apply(a.created_time.cmp(&b.created_time)),
            Sort::Property(name, direction) => {
                let (a, b) = (SortKey::of(a, name), SortKey::of(b, name));
                match (&a, &b) {
                    (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
                    (SortKey::Missing, _) => Ordering::Greater,
                    (_, SortKey::Missing) => Ordering::Less,
                    _ => direction.apply(a.cmp_key(&b)),
                }
            }
        }
    }
}

/// Comparable projection of a property value.
#[derive(Debug, PartialEq)]
enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of(page: &Page, name: &str) -> Self {
        let Some(prop) = page.property(name) else {
            return SortKey::Missing;
        };
        if let Some(n) = prop.get("number").and_then(Value::as_f64) {
            return SortKey::Number(n);
        }
        if let Some(b) = prop.get("checkbox").and_then(Value::as_bool) {
            return SortKey::Number(if b { 1.0 } else { 0.0 });
        }
        if prop.get("date").is_some() {
            return page
                .date(name)
                .map(|d| SortKey::Text(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(SortKey::Missing);
        }
        if prop.get("select").is_some() {
            return page.select(name).map(SortKey::Text).unwrap_or(SortKey::Missing);
        }
        if prop.get("title").is_some() {
            return SortKey::Text(page.title(name));
        }
        if prop.get("rich_text").is_some() {
            return SortKey::Text(page.text(name));
        }
        SortKey::Missing
    }

    /// Orders present values. Missing values are placed by the caller so
    /// that they sort last in either direction, as in Notion.
    fn cmp_key(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Missing, _) | (_, SortKey::Missing) => Ordering::Equal,
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// A database query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<Filter>,
    pub sorts: Vec<Sort>,
    /// Stop after this many results.
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn maybe_filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query body for one page of results.
    pub fn to_json(&self, page_size: usize, start_cursor: Option<&str>) -> Value {
        let mut body = json!({ "page_size": page_size });
        if let Some(filter) = &self.filter {
            body["filter"] = filter.to_json();
        }
        if !self.sorts.is_empty() {
            body["sorts"] = Value::Array(self.sorts.iter().map(Sort::to_json).collect());
        }
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = Value::String(cursor.to_string());
        }
        body
    }

    /// Applies the query to pages locally.
    pub fn apply(&self, pages: impl Iterator<Item = Page>) -> Vec<Page> {
        let mut matched: Vec<Page> = pages
            .filter(|p| self.filter.as_ref().map_or(true, |f| f.matches(p)))
            .collect();

        if !self.sorts.is_empty() {
            matched.sort_by(|a, b| {
                self.sorts
                    .iter()
                    .map(|s| s.compare(a, b))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}
