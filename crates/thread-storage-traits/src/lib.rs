//! Thread storage - A set of storage provider traits and types for thread reconciliation
//!
//! The event, chunk, summary, reaction and member stores live behind one
//! persistence boundary. [`ThreadStorageProvider::transaction`] composes their
//! write primitives into one atomic commit.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod chunks;
pub mod error;
pub mod events;
pub mod ids;
pub mod members;
pub mod reactions;
pub mod summaries;

pub use error::ThreadStorageError;
pub use ids::{Cursor, EventId, RoomId, UserId};

use self::chunks::ChunkStorage;
use self::chunks::types::ThreadChunk;
use self::events::EventStorage;
use self::events::types::EventRecord;
use self::members::MemberStorage;
use self::members::types::MemberSnapshot;
use self::reactions::ReactionStorage;
use self::reactions::types::ReactionAggregate;
use self::summaries::ThreadSummaryStorage;
use self::summaries::types::ThreadSummary;

/// Backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Memory
    Memory,
    /// A persistent backend provided outside this workspace
    Persistent,
}

impl Backend {
    /// Check if it's a persistent backend
    ///
    /// All values different from [`Backend::Memory`] are considered persistent
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::Memory)
    }
}

/// Read and write primitives available inside one atomic transaction.
///
/// Reads observe the writes already performed through the same transaction.
/// Nothing written here is visible to other readers until the transaction
/// closure returns `Ok`.
pub trait StorageTransaction {
    /// Find an event record by identity
    fn find_event(
        &self,
        room_id: &RoomId,
        event_id: &EventId,
    ) -> Result<Option<EventRecord>, ThreadStorageError>;

    /// Insert an event record. Returns `false` if one with the same identity exists.
    fn insert_event(&mut self, record: EventRecord) -> Result<bool, ThreadStorageError>;

    /// Find the chunk of a thread
    fn find_chunk(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Option<ThreadChunk>, ThreadStorageError>;

    /// Append an identifier at the forward end of a chunk.
    ///
    /// Returns `false` if the chunk already references the identifier, and
    /// [`ThreadStorageError::NotFound`] if the chunk doesn't exist.
    fn append_to_chunk(
        &mut self,
        room_id: &RoomId,
        root_event_id: &EventId,
        event_id: EventId,
    ) -> Result<bool, ThreadStorageError>;

    /// Set the cursor to older replies of a chunk, `None` included.
    ///
    /// Returns [`ThreadStorageError::NotFound`] if the chunk doesn't exist.
    fn set_prev_token(
        &mut self,
        room_id: &RoomId,
        root_event_id: &EventId,
        prev_token: Option<Cursor>,
    ) -> Result<(), ThreadStorageError>;

    /// Find the membership snapshot of a user
    fn find_member_snapshot(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<Option<MemberSnapshot>, ThreadStorageError>;

    /// Find a reaction aggregate
    fn find_reaction(
        &self,
        room_id: &RoomId,
        target_event_id: &EventId,
        key: &str,
    ) -> Result<Option<ReactionAggregate>, ThreadStorageError>;

    /// Save (replace) a reaction aggregate
    fn save_reaction(&mut self, aggregate: ReactionAggregate) -> Result<(), ThreadStorageError>;

    /// Find the summary of a thread
    fn find_thread_summary(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Option<ThreadSummary>, ThreadStorageError>;

    /// Save (replace) the summary of a thread
    fn save_thread_summary(&mut self, summary: ThreadSummary) -> Result<(), ThreadStorageError>;
}

/// Storage provider for thread reconciliation.
///
/// Implementors must provide:
/// - Event storage, shared with main-timeline ingestion
/// - Chunk storage for thread chunks and their pagination cursor
/// - Thread summary storage
/// - Reaction aggregate storage
/// - Member snapshot storage
/// - Atomic transactions across all of the above
pub trait ThreadStorageProvider:
    EventStorage + ChunkStorage + ThreadSummaryStorage + ReactionStorage + MemberStorage
{
    /// Returns the backend type.
    fn backend(&self) -> Backend;

    /// Run `f` as one atomic transaction.
    ///
    /// When `f` returns `Ok` every write it performed becomes visible at once.
    /// When it returns `Err` (or panics) none of them do. Implementations must
    /// also serialize the existence checks made inside `f` with other writers,
    /// so that "does this record exist" stays a single source of truth.
    fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn StorageTransaction) -> Result<R, E>,
        E: From<ThreadStorageError>;
}
