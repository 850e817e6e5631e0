//! Callback interface for thread sync events.
//!
//! [`ThreadSyncCallback`] lets applications observe the situations the engine
//! absorbs without failing the call: a merge requested for a thread that has
//! no chunk, and a fully paginated thread whose root is still unknown.

use std::fmt::Debug;

use thread_storage_traits::{EventId, RoomId};

/// Callback interface for thread sync events.
pub trait ThreadSyncCallback: Send + Sync + Debug {
    /// A page merge was requested for a thread without a local chunk.
    ///
    /// Nothing was fetched or written. Chunk creation belongs to the thread
    /// lifecycle owner, which may want to create the chunk and retry.
    fn on_missing_chunk(&self, room_id: &RoomId, root_event_id: &EventId);

    /// The oldest page of a thread was merged but its root event is unknown.
    ///
    /// A later merge resolves the root once it reaches the event store by
    /// other means.
    fn on_root_unresolved(&self, room_id: &RoomId, root_event_id: &EventId);
}
