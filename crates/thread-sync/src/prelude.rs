//! Thread sync public prelude
//!
//! The engine, its configuration and the storage traits users need to drive
//! reconciliation.
//!
//! ## Usage
//!
//! ```rust
//! use thread_sync::prelude::*;
//! ```

// === Core Types ===
/// Thread sync error type
pub use crate::Error;
/// The reconciliation engine and its builder
pub use crate::{ThreadSync, ThreadSyncBuilder, ThreadSyncConfig};

// === Operation Results ===
/// Discovery options and result
pub use crate::discovery::{DiscoveryOptions, DiscoveryOutcome};
/// Page merge results
pub use crate::merge::{Continuation, EventLookup, ThreadPagination};

// === Collaborators ===
/// Remote API
pub use crate::api::{
    Direction, PaginatedMessages, PaginatedRelations, RelationsRequest, RoomEventFilter,
    RoomMessagesRequest, ThreadsApi, TransportError,
};
/// Callbacks
pub use crate::callback::ThreadSyncCallback;
/// Decryption hook
pub use crate::decryption::EventDecryptor;

// === Storage Traits ===
pub use thread_storage_traits::{
    Backend, Cursor, EventId, RoomId, StorageTransaction, ThreadStorageError,
    ThreadStorageProvider, UserId,
};
pub use thread_storage_traits::chunks::ChunkStorage;
pub use thread_storage_traits::events::EventStorage;
pub use thread_storage_traits::members::MemberStorage;
pub use thread_storage_traits::reactions::ReactionStorage;
pub use thread_storage_traits::summaries::ThreadSummaryStorage;

// === Storage Type Aliases ===
pub use thread_storage_traits::chunks::types as chunk_types;
pub use thread_storage_traits::events::types as event_types;
pub use thread_storage_traits::members::types as member_types;
pub use thread_storage_traits::reactions::types as reaction_types;
pub use thread_storage_traits::summaries::types as summary_types;
