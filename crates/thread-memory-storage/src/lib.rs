//! Memory-based storage implementation for thread reconciliation.
//!
//! This crate provides a memory-based implementation of the
//! `ThreadStorageProvider` trait. It is non-persistent and cleared when the
//! application terminates, which makes it the backend of choice for tests and
//! ephemeral clients.
//!
//! # Transactions
//!
//! [`ThreadStorageProvider::transaction`] holds the global write lock for the
//! whole closure. Writes go to a journal that is applied to the stores only
//! when the closure returns `Ok`; an `Err` or a panic drops the journal, so a
//! partially processed page is never visible.
//!
//! ## Customizing Limits
//!
//! ```rust
//! use thread_memory_storage::{ThreadMemoryStorage, ValidationLimits};
//!
//! let limits = ValidationLimits::default().with_cache_size(2000);
//! let storage = ThreadMemoryStorage::with_limits(limits);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::RwLock;
use thread_storage_traits::chunks::types::ThreadChunk;
use thread_storage_traits::events::types::EventRecord;
use thread_storage_traits::members::types::MemberSnapshot;
use thread_storage_traits::reactions::types::ReactionAggregate;
use thread_storage_traits::summaries::types::ThreadSummary;
use thread_storage_traits::{
    Backend, EventId, RoomId, StorageTransaction, ThreadStorageError, ThreadStorageProvider,
    UserId,
};

mod chunks;
mod events;
mod members;
mod reactions;
mod summaries;
mod transaction;

use self::transaction::MemoryTransaction;

/// Default size of the member snapshot cache
const DEFAULT_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(v) => v,
    None => panic!("cache size must be non-zero"),
};

pub(crate) type ThreadKey = (RoomId, EventId);
pub(crate) type ReactionKey = (RoomId, EventId, String);

/// Configurable limits for memory storage.
#[derive(Debug, Clone, Copy)]
pub struct ValidationLimits {
    /// Maximum number of member snapshots kept in the LRU cache
    pub cache_size: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE.get(),
        }
    }
}

impl ValidationLimits {
    /// Creates a new `ValidationLimits` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of member snapshots kept in memory.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        assert!(size > 0, "cache_size must be greater than 0");
        self.cache_size = size;
        self
    }
}

/// A memory-based storage implementation for thread reconciliation.
///
/// ## Thread Safety
///
/// All stores sit behind one `RwLock`, which allows:
/// - Multiple concurrent readers (for find/list operations)
/// - Exclusive writers (for insert/save/transaction operations)
///
/// Event records are never evicted: the Event Store is the single source of
/// truth for event identity. Only member snapshots, which can be resolved
/// again, live in a bounded LRU cache.
pub struct ThreadMemoryStorage {
    /// Configurable validation limits
    limits: ValidationLimits,
    /// Thread-safe inner storage
    inner: RwLock<ThreadMemoryStorageInner>,
}

pub(crate) struct ThreadMemoryStorageInner {
    pub(crate) events: HashMap<ThreadKey, EventRecord>,
    pub(crate) room_timelines: HashMap<RoomId, Vec<EventId>>,
    pub(crate) chunks: HashMap<ThreadKey, ThreadChunk>,
    pub(crate) summaries: HashMap<ThreadKey, ThreadSummary>,
    pub(crate) reactions: HashMap<ReactionKey, ReactionAggregate>,
    pub(crate) members: LruCache<(RoomId, UserId), MemberSnapshot>,
}

impl fmt::Debug for ThreadMemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadMemoryStorage")
            .field("limits", &self.limits)
            .field("inner", &"RwLock<ThreadMemoryStorageInner>")
            .finish()
    }
}

impl Default for ThreadMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadMemoryStorage {
    /// Creates a new `ThreadMemoryStorage` with the default configuration.
    pub fn new() -> Self {
        Self::with_limits(ValidationLimits::default())
    }

    /// Creates a new `ThreadMemoryStorage` with the provided validation limits.
    pub fn with_limits(limits: ValidationLimits) -> Self {
        let cache_size = NonZeroUsize::new(limits.cache_size).unwrap_or(DEFAULT_CACHE_SIZE);

        let inner = ThreadMemoryStorageInner {
            events: HashMap::new(),
            room_timelines: HashMap::new(),
            chunks: HashMap::new(),
            summaries: HashMap::new(),
            reactions: HashMap::new(),
            members: LruCache::new(cache_size),
        };

        Self {
            limits,
            inner: RwLock::new(inner),
        }
    }

    /// The limits this storage was created with
    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }
}

impl ThreadStorageProvider for ThreadMemoryStorage {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn StorageTransaction) -> Result<R, E>,
        E: From<ThreadStorageError>,
    {
        let mut guard = self.inner.write();

        let mut tx = MemoryTransaction::new(&guard);
        let result = f(&mut tx)?;
        let journal = tx.into_journal();

        journal.apply(&mut guard);
        Ok(result)
    }
}
