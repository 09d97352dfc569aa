//! API configuration.

use std::time::{Duration, Instant};

/// Requests allowed per window for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    /// Session token lifetime.
    pub token_ttl: Duration,
    /// Limit applied to every request.
    pub rate_limit: RateLimitConfig,
    /// Stricter limit applied to login attempts.
    pub login_rate_limit: RateLimitConfig,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl ServerConfig {
    /// Creates a new configuration with the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_rate_limit(mut self, limit: RateLimitConfig) -> Self {
        self.rate_limit = limit;
        self
    }

    pub fn with_login_rate_limit(mut self, limit: RateLimitConfig) -> Self {
        self.login_rate_limit = limit;
        self
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            jwt_secret: String::new(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            rate_limit: RateLimitConfig::new(100, Duration::from_secs(60)),
            login_rate_limit: RateLimitConfig::new(10, Duration::from_secs(60)),
            start_time: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert!(config.allows_any_origin());
        assert_eq!(config.token_ttl, Duration::from_secs(86_400));
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.login_rate_limit.max_requests, 10);
    }

    #[test]
    fn test_server_config_builders() {
        let config = ServerConfig::new("0.0.0.0", 8080)
            .with_cors_origins(vec!["https://admin.example.com".to_string()])
            .with_jwt_secret("s")
            .with_login_rate_limit(RateLimitConfig::new(3, Duration::from_secs(300)));

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(!config.allows_any_origin());
        assert_eq!(config.jwt_secret, "s");
        assert_eq!(config.login_rate_limit.window, Duration::from_secs(300));
    }
}
