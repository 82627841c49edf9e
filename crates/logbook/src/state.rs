//! Application state.
//!
//! Holds the entry and user services and the auth state. The store backend is
//! chosen by feature flag; the response cache is always the in-process memory
//! cache.

use std::sync::Arc;

use logbook_auth::{AuthConfig, AuthState};
use logbook_core::storage::{EntryRepository, UserRepository};

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::service::{EntryService, UserService};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub entries: EntryService,
    pub users: UserService,
    pub auth: AuthState,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    /// Wires both services around `repo` with a shared, fresh memory cache.
    pub fn build<R>(repo: Arc<R>, config: &Config, auth: AuthConfig) -> Self
    where
        R: EntryRepository + UserRepository + 'static,
    {
        let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
        let auth = AuthState::new(auth);

        Self {
            entries: EntryService::new(repo.clone(), cache.clone(), config.cache_policy()),
            users: UserService::new(repo.clone(), repo, cache, auth.clone()),
            auth,
        }
    }

    /// Runs startup tasks that need the store, such as seeding the
    /// administrator account.
    pub async fn bootstrap(&self, config: &Config) -> Result<(), anyhow::Error> {
        if let Some(seed) = &config.admin {
            self.users.seed_admin(seed).await?;
        }
        Ok(())
    }
}

// ============================================================================
// Factory functions for the storage backends
// ============================================================================

#[cfg(feature = "inmemory")]
mod inmemory {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage.
        /// Entries are lost when the process exits.
        pub async fn new(config: &Config, auth: AuthConfig) -> Result<Self, anyhow::Error> {
            tracing::info!("Using in-memory storage");
            Ok(Self::build(
                Arc::new(InMemoryRepository::new()),
                config,
                auth,
            ))
        }
    }
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage at `config.sqlite_path`.
        pub async fn new(config: &Config, auth: AuthConfig) -> Result<Self, anyhow::Error> {
            let repo = SqliteRepository::new(&config.sqlite_path).await?;
            tracing::info!(path = %config.sqlite_path, "Using SQLite storage");
            Ok(Self::build(Arc::new(repo), config, auth))
        }
    }
}

// ============================================================================
// Test support - provides Default implementation for unit tests
// ============================================================================

#[cfg(test)]
mod test_support {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl Default for AppState {
        fn default() -> Self {
            let config = Config {
                cache_sliding_seconds: 120,
                cache_absolute_seconds: 600,
                cache_max_entries: 1_000,
                sqlite_path: ":memory:".to_string(),
                admin: None,
            };
            Self::build(
                Arc::new(InMemoryRepository::new()),
                &config,
                AuthConfig::new("test-secret"),
            )
        }
    }
}
