//! Application state shared across handlers.

use std::sync::Arc;

use retail_auth::{AuthError, RateLimiter, TokenIssuer};
use retail_notion::RecordStore;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ServerConfig>,
    /// Record store (Notion in production, in-memory in tests).
    pub store: Arc<dyn RecordStore>,
    /// Session token issuer.
    pub tokens: Arc<TokenIssuer>,
    /// Per-client limiter for all requests.
    pub limiter: Arc<RateLimiter>,
    /// Per-client limiter for login attempts.
    pub login_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates the state. Fails if the JWT secret is too weak.
    pub fn new(config: ServerConfig, store: Arc<dyn RecordStore>) -> Result<Self, AuthError> {
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl)?;
        let limiter = RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window);
        let login_limiter = RateLimiter::new(
            config.login_rate_limit.max_requests,
            config.login_rate_limit.window,
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens: Arc::new(tokens),
            limiter: Arc::new(limiter),
            login_limiter: Arc::new(login_limiter),
        })
    }

    /// The record store as a trait object.
    pub fn records(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retail_notion::MemoryStore;

    #[test]
    fn test_weak_secret_rejected() {
        let config = ServerConfig::default().with_jwt_secret("too-short");
        let result = AppState::new(config, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(AuthError::WeakSecret(_))));
    }

    #[test]
    fn test_limiters_follow_config() {
        let state = crate::test_support::test_state();
        assert_eq!(
            state.limiter.max_requests(),
            state.config.rate_limit.max_requests
        );
        assert_eq!(
            state.login_limiter.window(),
            state.config.login_rate_limit.window
        );
    }
}
