//! Types for the chunks module

use serde::{Deserialize, Serialize};

use crate::ids::{Cursor, EventId, RoomId};

/// The ordered, duplicate-free window of a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadChunk {
    /// The room of the thread
    pub room_id: RoomId,
    /// The thread root
    pub root_event_id: EventId,
    /// Event identifiers in append order
    event_ids: Vec<EventId>,
    /// Cursor to older replies that are not fetched yet.
    ///
    /// `None` on a chunk that has been paginated means the oldest reply is known
    /// locally.
    pub prev_token: Option<Cursor>,
}

impl ThreadChunk {
    /// Create an empty chunk
    pub fn new(room_id: RoomId, root_event_id: EventId) -> Self {
        Self {
            room_id,
            root_event_id,
            event_ids: Vec::new(),
            prev_token: None,
        }
    }

    /// Event identifiers in append order
    pub fn event_ids(&self) -> &[EventId] {
        &self.event_ids
    }

    /// Whether the chunk already references `event_id`
    pub fn contains(&self, event_id: &EventId) -> bool {
        self.event_ids.contains(event_id)
    }

    /// Append an identifier at the forward end.
    ///
    /// Returns `false` without modifying the chunk if the identifier is already
    /// present.
    pub fn append(&mut self, event_id: EventId) -> bool {
        if self.contains(&event_id) {
            return false;
        }
        self.event_ids.push(event_id);
        true
    }

    /// Number of referenced events
    pub fn len(&self) -> usize {
        self.event_ids.len()
    }

    /// Whether the chunk references no event
    pub fn is_empty(&self) -> bool {
        self.event_ids.is_empty()
    }
}
