//! In-memory fixed-window rate limiter.
//!
//! Each key (a client address) gets `max_requests` per `window`. The window
//! opens on the key's first request and the count resets once it has
//! elapsed. State lives in this process only: it is lost on restart and
//! not shared between instances.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a request from `key` at `now`.
    pub fn check(&self, key: &str, now: Instant) -> Decision {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            warn!(key = %key, "Rate limit exceeded");
            return Decision::Limited { retry_after };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    pub fn check_now(&self, key: &str) -> Decision {
        self.check(key, Instant::now())
    }

    /// Drops keys whose window has elapsed. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        before - entries.len()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let t0 = Instant::now();

        assert_eq!(limiter.check("1.2.3.4", t0), Decision::Allowed { remaining: 2 });
        assert_eq!(limiter.check("1.2.3.4", t0), Decision::Allowed { remaining: 1 });
        assert_eq!(limiter.check("1.2.3.4", t0), Decision::Allowed { remaining: 0 });

        let later = t0 + Duration::from_secs(20);
        assert_eq!(
            limiter.check("1.2.3.4", later),
            Decision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(limiter.check("a", t0).is_allowed());
        assert!(!limiter.check("a", t0).is_allowed());
        assert!(limiter.check("b", t0).is_allowed());
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(limiter.check("a", t0).is_allowed());
        assert!(!limiter.check("a", t0 + Duration::from_secs(9)).is_allowed());
        assert_eq!(
            limiter.check("a", t0 + Duration::from_secs(10)),
            Decision::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn test_purge_expired() {
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        let t0 = Instant::now();
        limiter.check("old", t0);
        limiter.check("new", t0 + Duration::from_secs(8));
        assert_eq!(limiter.len(), 2);

        assert_eq!(limiter.purge_expired(t0 + Duration::from_secs(12)), 1);
        assert_eq!(limiter.len(), 1);
        assert!(!limiter.is_empty());
    }
}
