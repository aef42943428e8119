//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::DirectoryConfig;
use crate::db::Storage;
use crate::services::{AccountService, CafeRegistry, PasswordHasher};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the storage backend and the services built on it.
pub struct AppState<S: Storage> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S: Storage> {
    config: DirectoryConfig,
    storage: S,
    accounts: AccountService<S::Users>,
    registry: CafeRegistry<S::Cafes>,
}

// Manual impl: cloning the handle never requires cloning `S`.
impl<S: Storage> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Storage> AppState<S> {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Directory configuration
    /// * `storage` - Storage backend the services are built on
    /// * `hasher` - Password hasher for the account service
    #[must_use]
    pub fn new(config: DirectoryConfig, storage: S, hasher: PasswordHasher) -> Self {
        let accounts = AccountService::new(storage.users(), hasher);
        let registry = CafeRegistry::new(storage.cafes());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                accounts,
                registry,
            }),
        }
    }

    /// Get a reference to the directory configuration.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    /// Get a reference to the account service.
    #[must_use]
    pub fn accounts(&self) -> &AccountService<S::Users> {
        &self.inner.accounts
    }

    /// Get a reference to the cafe registry.
    #[must_use]
    pub fn registry(&self) -> &CafeRegistry<S::Cafes> {
        &self.inner.registry
    }
}
