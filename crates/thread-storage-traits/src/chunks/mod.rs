//! Chunks module
//!
//! A [`ThreadChunk`](types::ThreadChunk) is the locally cached, ordered window of
//! one thread plus the cursor pointing at older replies that are not fetched yet.
//!
//! Chunk creation and deletion belong to the room/thread lifecycle; the
//! reconciliation engine only appends to existing chunks inside a
//! [`StorageTransaction`](crate::StorageTransaction).

pub mod types;

use crate::error::ThreadStorageError;
use crate::events::types::EventRecord;
use crate::ids::{EventId, RoomId};

use self::types::ThreadChunk;

/// Storage traits for the chunks module
pub trait ChunkStorage {
    /// Create an empty chunk for a thread.
    ///
    /// If the chunk already exists it is returned unchanged.
    fn create_thread_chunk(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<ThreadChunk, ThreadStorageError>;

    /// Find the chunk of a thread
    fn find_thread_chunk(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Option<ThreadChunk>, ThreadStorageError>;

    /// Records of a thread chunk in chunk order, resolved through the Event Store
    ///
    /// Returns [`ThreadStorageError::NotFound`] if the chunk doesn't exist.
    fn thread_chunk_events(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Vec<EventRecord>, ThreadStorageError>;

    /// Delete the chunk of a thread. Event records are kept.
    ///
    /// Returns `true` if a chunk was removed.
    fn delete_thread_chunk(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<bool, ThreadStorageError>;
}
