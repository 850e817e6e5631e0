//! Thread reconciliation for a messaging client
//!
//! Threads reach the client through two independently paginated APIs: room
//! messages filtered to thread roots (thread discovery) and the relations of
//! one root (thread replies). This crate folds both into one locally
//! consistent view:
//!
//! - [`ThreadSync::discover_threads`] writes room-level thread summaries.
//! - [`ThreadSync::merge_thread_page`] folds one page of replies into the
//!   thread's chunk, sharing event records with the main room timeline.
//! - [`ThreadSync::apply_live_thread_reply`] keeps summaries current as
//!   replies arrive through live sync.
//!
//! All writes of one call go through a single storage transaction.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::sync::Arc;

use thread_storage_traits::ThreadStorageProvider;

pub mod api;
pub mod callback;
pub mod decryption;
pub mod discovery;
pub mod error;
pub mod merge;
pub mod prelude;
pub mod reactions;
#[cfg(test)]
pub mod test_util;
mod util;

use self::api::ThreadsApi;
use self::callback::ThreadSyncCallback;
use self::decryption::EventDecryptor;
pub use self::error::Error;

pub use thread_storage_traits::{Cursor, EventId, RoomId, UserId};

/// Thread sync result
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Configuration for thread reconciliation
///
/// # Examples
///
/// ```rust
/// use thread_sync::ThreadSyncConfig;
///
/// let config = ThreadSyncConfig {
///     relations_page_limit: 20,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ThreadSyncConfig {
    /// Number of thread roots requested per discovery page.
    ///
    /// Default: 500
    pub discovery_page_limit: u32,

    /// Number of replies requested per relations page.
    ///
    /// Default: 50
    pub relations_page_limit: u32,

    /// Upper bound on pages merged by one [`ThreadSync::paginate_thread`] call.
    ///
    /// Default: 100
    pub max_pages_per_pagination: usize,
}

impl Default for ThreadSyncConfig {
    fn default() -> Self {
        Self {
            discovery_page_limit: 500,
            relations_page_limit: 50,
            max_pages_per_pagination: 100,
        }
    }
}

impl ThreadSyncConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }
}

/// Builder for [`ThreadSync`]
#[derive(Debug)]
pub struct ThreadSyncBuilder<Storage, Api> {
    storage: Storage,
    api: Api,
    user_id: UserId,
    config: ThreadSyncConfig,
    decryptor: Option<Arc<dyn EventDecryptor>>,
    callback: Option<Arc<dyn ThreadSyncCallback>>,
}

impl<Storage, Api> ThreadSyncBuilder<Storage, Api>
where
    Storage: ThreadStorageProvider,
    Api: ThreadsApi,
{
    /// Create a new builder for the local user `user_id`
    pub fn new(storage: Storage, api: Api, user_id: UserId) -> Self {
        Self {
            storage,
            api,
            user_id,
            config: ThreadSyncConfig::default(),
            decryptor: None,
            callback: None,
        }
    }

    /// Set a custom configuration
    pub fn with_config(mut self, config: ThreadSyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the decryptor used for encrypted events
    pub fn with_decryptor(mut self, decryptor: Arc<dyn EventDecryptor>) -> Self {
        self.decryptor = Some(decryptor);
        self
    }

    /// Set a callback for thread sync events
    pub fn with_callback(mut self, callback: Arc<dyn ThreadSyncCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Build the [`ThreadSync`] instance
    pub fn build(self) -> ThreadSync<Storage, Api> {
        let backend = self.storage.backend();
        tracing::debug!(
            target: "thread_sync::build",
            ?backend,
            persistent = backend.is_persistent(),
            decryptor = self.decryptor.is_some(),
            "Built thread sync"
        );

        ThreadSync {
            storage: self.storage,
            api: self.api,
            user_id: self.user_id,
            config: self.config,
            decryptor: self.decryptor,
            callback: self.callback,
        }
    }
}

/// The thread reconciliation engine.
///
/// Discovery and page merges for different rooms and threads may run
/// concurrently. Merges of the same thread must be serialized by the caller.
#[derive(Debug)]
pub struct ThreadSync<Storage, Api> {
    storage: Storage,
    api: Api,
    user_id: UserId,
    /// Configuration
    pub config: ThreadSyncConfig,
    decryptor: Option<Arc<dyn EventDecryptor>>,
    callback: Option<Arc<dyn ThreadSyncCallback>>,
}

impl<Storage, Api> ThreadSync<Storage, Api>
where
    Storage: ThreadStorageProvider,
    Api: ThreadsApi,
{
    /// Construct a new instance with the default configuration
    pub fn new(storage: Storage, api: Api, user_id: UserId) -> Self {
        Self::builder(storage, api, user_id).build()
    }

    /// Create a builder
    pub fn builder(storage: Storage, api: Api, user_id: UserId) -> ThreadSyncBuilder<Storage, Api> {
        ThreadSyncBuilder::new(storage, api, user_id)
    }

    /// Get the storage provider
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Get the remote API client
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// The local user
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
