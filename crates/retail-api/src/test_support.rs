//! Shared fixtures for router tests.

use std::sync::{Arc, OnceLock};

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum_test::TestServer;

use retail_auth::hash_password;
use retail_models::{record, Role, Store, User};
use retail_notion::MemoryStore;

use crate::config::ServerConfig;
use crate::router::create_router;
use crate::state::AppState;

pub(crate) const TEST_SECRET: &str = "router-tests-secret-0123456789abcdef";
pub(crate) const PASSWORD: &str = "correct-horse";

/// Argon2 is slow in debug builds; hash once for every fixture user.
fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).unwrap())
}

pub(crate) fn test_config() -> ServerConfig {
    ServerConfig::default().with_jwt_secret(TEST_SECRET)
}

pub(crate) fn test_state() -> AppState {
    AppState::new(test_config(), Arc::new(MemoryStore::new())).unwrap()
}

/// Two stores, an admin, a manager and a staff member in store A, and a
/// staff member in store B.
pub(crate) struct Fixture {
    pub state: AppState,
    pub server: TestServer,
    pub store_a: Store,
    pub store_b: Store,
    pub admin: User,
    pub manager_a: User,
    pub staff_a: User,
    pub staff_b: User,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: ServerConfig) -> Self {
        let state = AppState::new(config, Arc::new(MemoryStore::new())).unwrap();
        let store = state.records();

        let store_a = record::insert(store, &Store::new("Harbor", "HB-01")).await.unwrap();
        let store_b = record::insert(store, &Store::new("Uptown", "UP-02")).await.unwrap();

        let user = |name: &str, email: &str, role: Role, store_id: Option<&Store>| {
            User::new(name, email, role, store_id.map(|s| s.id.clone()))
                .with_password_hash(password_hash())
        };
        let admin = record::insert(store, &user("Ada", "ada@hq.com", Role::Admin, None))
            .await
            .unwrap();
        let manager_a = record::insert(
            store,
            &user("Max", "max@harbor.com", Role::Manager, Some(&store_a)),
        )
        .await
        .unwrap();
        let staff_a = record::insert(
            store,
            &user("Sam", "sam@harbor.com", Role::Staff, Some(&store_a)),
        )
        .await
        .unwrap();
        let staff_b = record::insert(
            store,
            &user("Bea", "bea@uptown.com", Role::Staff, Some(&store_b)),
        )
        .await
        .unwrap();

        let server = TestServer::new(create_router(state.clone())).unwrap();

        Self {
            state,
            server,
            store_a,
            store_b,
            admin,
            manager_a,
            staff_a,
            staff_b,
        }
    }

    pub fn token(&self, user: &User) -> String {
        self.state.tokens.issue(user).unwrap()
    }

    /// `Authorization` header for `user`.
    pub fn auth(&self, user: &User) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token(user))).unwrap();
        (AUTHORIZATION, value)
    }
}
