//! Token claims and permission checks.

use serde::{Deserialize, Serialize};

use retail_models::{Role, User};

use crate::error::{AuthError, Result};

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User page id.
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub store_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims for `user`, valid from `iat` until `exp` (unix seconds).
    pub fn for_user(user: &User, iat: i64, exp: i64) -> Self {
        Self {
            sub: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            store_id: user.store_id.clone(),
            iat,
            exp,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_self(&self, user_id: &str) -> bool {
        self.sub == user_id
    }

    /// Fails unless the caller's role is at least `min`.
    pub fn require(&self, min: Role) -> Result<()> {
        if self.role >= min {
            Ok(())
        } else {
            Err(AuthError::Forbidden(format!("requires {} role", min)))
        }
    }

    /// Admins reach every store; everyone else only their own. A record
    /// with no store is admin-only.
    pub fn can_access_store(&self, store_id: Option<&str>) -> bool {
        if self.is_admin() {
            return true;
        }
        match (self.store_id.as_deref(), store_id) {
            (Some(own), Some(target)) => own == target,
            _ => false,
        }
    }

    pub fn require_store(&self, store_id: Option<&str>) -> Result<()> {
        if self.can_access_store(store_id) {
            Ok(())
        } else {
            Err(AuthError::Forbidden("no access to this store".to_string()))
        }
    }

    /// The store a non-admin query must be restricted to.
    ///
    /// Admins get `requested` back unchanged (`None` = all stores). Other
    /// roles always get their own store; asking for a different one is
    /// forbidden, and having no store at all is too.
    pub fn scope_store(&self, requested: Option<&str>) -> Result<Option<String>> {
        if self.is_admin() {
            return Ok(requested.map(str::to_string));
        }
        let own = self
            .store_id
            .as_deref()
            .ok_or_else(|| AuthError::Forbidden("user has no store".to_string()))?;
        match requested {
            Some(other) if other != own => {
                Err(AuthError::Forbidden("no access to this store".to_string()))
            }
            _ => Ok(Some(own.to_string())),
        }
    }
}
