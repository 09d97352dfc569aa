//! User accounts and roles.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retail_notion::{DatabaseKind, Page, Properties};

use crate::record::NotionRecord;
use crate::validate::normalize_email;

/// Access role. Ordered: `Staff < Manager < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Store staff using the store app.
    #[default]
    Staff,
    /// Store manager: manages tasks and finances for one store.
    Manager,
    /// Head office: full access to every store.
    Admin,
}

impl Role {
    /// Parses a role name, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_lowercase().as_str() {
            "staff" => Some(Role::Staff),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Home store. Admins usually have none.
    pub store_id: Option<String>,
    /// Argon2 PHC string. Never sent to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: &str, role: Role, store_id: Option<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            email: normalize_email(email),
            role,
            store_id,
            password_hash: String::new(),
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = hash.into();
        self
    }
}

impl NotionRecord for User {
    const DATABASE: DatabaseKind = DatabaseKind::Users;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            name: page.title("Name"),
            email: normalize_email(&page.email("Email")),
            role: page
                .select("Role")
                .and_then(|r| Role::parse(&r))
                .unwrap_or_default(),
            store_id: page.relation("Store"),
            password_hash: page.text("Password Hash"),
            active: page.checkbox("Active"),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        Properties::new()
            .title("Name", &self.name)
            .email("Email", &self.email)
            .select("Role", self.role.as_str())
            .relation("Store", self.store_id.as_deref())
            .text("Password Hash", &self.password_hash)
            .checkbox("Active", self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin > Role::Manager);
        assert!(Role::Manager > Role::Staff);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse(" ADMIN "), Some(Role::Admin));
        assert_eq!(Role::parse("manager"), Some(Role::Manager));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("Ana", "Ana@Shop.com", Role::Staff, None).with_password_hash("$argon2id$x");
        assert_eq!(user.email, "ana@shop.com");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "staff");
    }

    #[test]
    fn test_unknown_role_defaults_to_staff() {
        let props = User::new("Bo", "bo@shop.com", Role::Admin, None)
            .to_properties()
            .select("Role", "owner");
        let page = Page {
            id: "u1".into(),
            created_time: Utc::now(),
            last_edited_time: Utc::now(),
            archived: false,
            parent: Default::default(),
            properties: props.into_map(),
        };
        let user = User::from_page(&page);
        assert_eq!(user.role, Role::Staff);
        assert_eq!(user.store_id, None);
    }
}
