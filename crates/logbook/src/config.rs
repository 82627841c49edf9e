use std::{env, time::Duration};

use logbook_core::cache::CachePolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Idle time after which a cached response expires (default: 120)
    pub cache_sliding_seconds: u64,
    /// Time after insertion at which a cached response expires (default: 600)
    pub cache_absolute_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Path to SQLite database file (default: "logbook.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Administrator account created at startup, if configured.
    pub admin: Option<AdminSeed>,
}

/// Credentials for the administrator account ensured at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AdminSeed {
    /// Reads `ADMIN_USERNAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`. All three
    /// must be set and non-empty.
    fn from_env() -> Option<Self> {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            user_name: var("ADMIN_USERNAME")?,
            email: var("ADMIN_EMAIL")?,
            password: var("ADMIN_PASSWORD")?,
        })
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_SLIDING_SECONDS` - Sliding expiration in seconds (default: 120)
    /// - `CACHE_ABSOLUTE_SECONDS` - Absolute expiration in seconds (default: 600)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "logbook.db")
    /// - `ADMIN_USERNAME`, `ADMIN_EMAIL`, `ADMIN_PASSWORD` - Administrator
    ///   account to ensure at startup (default: none)
    pub fn from_env() -> Self {
        Self {
            cache_sliding_seconds: env::var("CACHE_SLIDING_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
            cache_absolute_seconds: env::var("CACHE_ABSOLUTE_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(10_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "logbook.db".to_string()),
            admin: AdminSeed::from_env(),
        }
    }

    /// Expiration policy applied to every cached response.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(
            Duration::from_secs(self.cache_sliding_seconds),
            Duration::from_secs(self.cache_absolute_seconds),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
