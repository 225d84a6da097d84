//! Rate limiter for preventing brute force attacks on login

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failed attempts allowed inside one window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

impl RateLimiterConfig {
    /// Create a new RateLimiterConfig from environment variables
    ///
    /// # Environment Variables
    /// - `LOGIN_MAX_ATTEMPTS`: Failed attempts per window (default: 5)
    /// - `LOGIN_WINDOW_SECONDS`: Window length in seconds (default: 300)
    /// - `LOGIN_BAN_SECONDS`: Ban duration in seconds (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_attempts = std::env::var("LOGIN_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_attempts);

        let window_seconds = std::env::var("LOGIN_WINDOW_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.window_seconds);

        let ban_duration_seconds = std::env::var("LOGIN_BAN_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.ban_duration_seconds);

        Self {
            max_attempts,
            window_seconds,
            ban_duration_seconds,
        }
    }
}

/// Rate limiter entry
#[derive(Debug)]
struct RateLimiterEntry {
    /// Number of failed attempts in the current window
    attempts: u32,
    /// Start of the current window
    window_start: Instant,
    /// Ban expiration time
    ban_expires: Option<Instant>,
}

impl RateLimiterEntry {
    /// Window over and no ban in force
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.window_start) >= window
            && self.ban_expires.is_none_or(|ban_expires| now >= ban_expires)
    }
}

#[derive(Debug)]
struct Entries {
    by_key: HashMap<String, RateLimiterEntry>,
    last_sweep: Instant,
}

/// Rate limiter keyed by login identity
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<Entries>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(Entries {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_seconds)
    }

    /// Check whether a key may attempt to log in right now
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let Some((stale, ban_expires)) = entries
            .by_key
            .get(key)
            .map(|entry| (entry.is_stale(now, self.window()), entry.ban_expires))
        else {
            return true;
        };

        if stale {
            entries.by_key.remove(key);
            return true;
        }

        ban_expires.is_none_or(|ban_expires| now >= ban_expires)
    }

    /// Count one failed attempt, banning the key once the limit is reached
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = self.window();

        // At most one sweep per window keeps the map bounded by recent failures
        if now.duration_since(entries.last_sweep) >= window {
            let before = entries.by_key.len();
            entries.by_key.retain(|_, entry| !entry.is_stale(now, window));
            entries.last_sweep = now;
            let removed = before - entries.by_key.len();
            if removed > 0 {
                debug!(removed, "Swept stale rate limiter entries");
            }
        }

        let entry = entries.by_key.entry(key.to_string()).or_insert(RateLimiterEntry {
            attempts: 0,
            window_start: now,
            ban_expires: None,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.attempts = 0;
            entry.window_start = now;
        }

        entry.attempts += 1;

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
        }
    }

    /// Forget a key after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.by_key.remove(key);
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32, ban_duration_seconds: u64) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window_seconds: 300,
            ban_duration_seconds,
        })
    }

    #[tokio::test]
    async fn test_unknown_key_is_allowed() {
        let limiter = limiter(3, 60);
        assert!(limiter.is_allowed("nobody@example.com").await);
    }

    #[tokio::test]
    async fn test_bans_after_max_failures() {
        let limiter = limiter(3, 60);
        let key = "ada@example.com";

        limiter.record_failure(key).await;
        limiter.record_failure(key).await;
        assert!(limiter.is_allowed(key).await);

        limiter.record_failure(key).await;
        assert!(!limiter.is_allowed(key).await);

        // Other keys are unaffected
        assert!(limiter.is_allowed("grace@example.com").await);
    }

    #[tokio::test]
    async fn test_reset_clears_failures() {
        let limiter = limiter(2, 60);
        let key = "ada@example.com";

        limiter.record_failure(key).await;
        limiter.reset(key).await;
        limiter.record_failure(key).await;
        assert!(limiter.is_allowed(key).await);
    }

    #[tokio::test]
    async fn test_ban_expires() {
        let limiter = limiter(1, 0);
        let key = "ada@example.com";

        limiter.record_failure(key).await;
        assert!(limiter.is_allowed(key).await);
    }

    #[tokio::test]
    async fn test_expired_windows_are_forgotten() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_attempts: 5,
            window_seconds: 0,
            ban_duration_seconds: 0,
        });

        for i in 0..1000 {
            limiter.record_failure(&format!("user{}@example.com", i)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        limiter.record_failure("last@example.com").await;
        assert_eq!(limiter.entries.lock().await.by_key.len(), 1);

        assert!(limiter.is_allowed("last@example.com").await);
        assert!(limiter.entries.lock().await.by_key.is_empty());
    }

    #[tokio::test]
    async fn test_active_ban_survives_sweep() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_attempts: 1,
            window_seconds: 0,
            ban_duration_seconds: 60,
        });

        limiter.record_failure("ada@example.com").await;
        limiter.record_failure("grace@example.com").await;

        assert_eq!(limiter.entries.lock().await.by_key.len(), 2);
        assert!(!limiter.is_allowed("ada@example.com").await);
    }

    #[test]
    fn test_default_config() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.window_seconds, 300);
        assert_eq!(config.ban_duration_seconds, 3600);
    }
}
