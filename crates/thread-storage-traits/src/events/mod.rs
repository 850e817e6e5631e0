//! Events module
//!
//! The Event Store holds exactly one [`EventRecord`](types::EventRecord) per
//! `(room_id, event_id)`. Thread chunks and the main room timeline only keep
//! identifiers, so edits, reactions and decryption results written to a record
//! are seen by every consumer.

pub mod types;

use crate::error::ThreadStorageError;
use crate::ids::{EventId, RoomId};

use self::types::*;

/// Storage traits for the events module
pub trait EventStorage {
    /// Find an event record by identity
    fn find_event(
        &self,
        room_id: &RoomId,
        event_id: &EventId,
    ) -> Result<Option<EventRecord>, ThreadStorageError>;

    /// Insert an event record.
    ///
    /// Returns `false` and leaves the stored record untouched when a record with
    /// the same identity already exists.
    fn insert_event(&self, record: EventRecord) -> Result<bool, ThreadStorageError>;

    /// Main-timeline ingestion: insert the record if absent and append its
    /// identifier to the room timeline.
    fn save_timeline_event(&self, record: EventRecord) -> Result<(), ThreadStorageError>;

    /// Main-timeline records of a room in ingestion order, resolved through the
    /// Event Store
    fn room_timeline(&self, room_id: &RoomId) -> Result<Vec<EventRecord>, ThreadStorageError>;

    /// Attach a decryption outcome to an existing record
    ///
    /// Returns [`ThreadStorageError::NotFound`] if the record doesn't exist.
    fn set_event_decryption(
        &self,
        room_id: &RoomId,
        event_id: &EventId,
        outcome: DecryptionOutcome,
    ) -> Result<(), ThreadStorageError>;

    /// Number of records stored for a room
    fn event_count(&self, room_id: &RoomId) -> Result<usize, ThreadStorageError>;
}
