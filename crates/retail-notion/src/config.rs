//! Notion connection configuration.

use std::fmt;

use url::Url;

use crate::error::{NotionError, Result};

/// Public Notion API root.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// API version sent in the `Notion-Version` header.
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// The Notion databases backing each record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    Stores,
    Users,
    Tasks,
    Comments,
    Forms,
    FormSubmissions,
    Notifications,
    Messages,
    Finance,
}

impl DatabaseKind {
    /// All database kinds, in configuration order.
    pub const ALL: [DatabaseKind; 9] = [
        DatabaseKind::Stores,
        DatabaseKind::Users,
        DatabaseKind::Tasks,
        DatabaseKind::Comments,
        DatabaseKind::Forms,
        DatabaseKind::FormSubmissions,
        DatabaseKind::Notifications,
        DatabaseKind::Messages,
        DatabaseKind::Finance,
    ];

    /// Short name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Stores => "stores",
            DatabaseKind::Users => "users",
            DatabaseKind::Tasks => "tasks",
            DatabaseKind::Comments => "comments",
            DatabaseKind::Forms => "forms",
            DatabaseKind::FormSubmissions => "form_submissions",
            DatabaseKind::Notifications => "notifications",
            DatabaseKind::Messages => "messages",
            DatabaseKind::Finance => "finance",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notion database ids, one per [`DatabaseKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseIds {
    pub stores: String,
    pub users: String,
    pub tasks: String,
    pub comments: String,
    pub forms: String,
    pub form_submissions: String,
    pub notifications: String,
    pub messages: String,
    pub finance: String,
}

impl DatabaseIds {
    /// Returns the configured id for a database.
    pub fn get(&self, kind: DatabaseKind) -> &str {
        match kind {
            DatabaseKind::Stores => &self.stores,
            DatabaseKind::Users => &self.users,
            DatabaseKind::Tasks => &self.tasks,
            DatabaseKind::Comments => &self.comments,
            DatabaseKind::Forms => &self.forms,
            DatabaseKind::FormSubmissions => &self.form_submissions,
            DatabaseKind::Notifications => &self.notifications,
            DatabaseKind::Messages => &self.messages,
            DatabaseKind::Finance => &self.finance,
        }
    }

    /// Finds which database an id belongs to.
    ///
    /// Notion returns ids in dashed UUID form while share links use the
    /// undashed form, so both sides are normalized before comparing.
    pub fn kind_of(&self, database_id: &str) -> Option<DatabaseKind> {
        let wanted = normalize_id(database_id);
        DatabaseKind::ALL
            .into_iter()
            .find(|kind| normalize_id(self.get(*kind)) == wanted)
    }

    /// Kinds that have no id configured.
    pub fn missing(&self) -> Vec<DatabaseKind> {
        DatabaseKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).trim().is_empty())
            .collect()
    }
}

/// Strips dashes and lowercases a Notion id.
pub fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Notion client configuration.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token.
    pub token: String,
    /// Value of the `Notion-Version` header.
    pub version: String,
    /// API root, overridable for proxies.
    pub base_url: String,
    /// Database ids.
    pub databases: DatabaseIds,
}

impl NotionConfig {
    /// Creates a configuration with the public API defaults.
    pub fn new(token: impl Into<String>, databases: DatabaseIds) -> Self {
        Self {
            token: token.into(),
            version: DEFAULT_NOTION_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            databases,
        }
    }

    /// Sets the API version header.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Checks that the token, base URL and every database id are usable.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(NotionError::Config("notion token is empty".to_string()));
        }
        Url::parse(&self.base_url)
            .map_err(|e| NotionError::Config(format!("invalid base url: {}", e)))?;

        let missing = self.databases.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|k| k.as_str()).collect();
            return Err(NotionError::Config(format!(
                "missing database ids: {}",
                names.join(", ")
            )));
        }
        Ok(())
    }
}
