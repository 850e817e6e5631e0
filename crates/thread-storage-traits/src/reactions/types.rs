//! Types for the reactions module

use serde::{Deserialize, Serialize};

use crate::ids::{EventId, RoomId};

/// Accumulated count of one reaction key on one event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReactionAggregate {
    /// The room of the target event
    pub room_id: RoomId,
    /// The annotated event
    pub target_event_id: EventId,
    /// The reaction key
    pub key: String,
    /// Number of times this key was seen. Never decremented here.
    pub count: u32,
    /// Server timestamp of the first event that carried this key
    pub first_timestamp: u64,
}

impl ReactionAggregate {
    /// Create an aggregate seen once
    pub fn first_seen(
        room_id: RoomId,
        target_event_id: EventId,
        key: String,
        first_timestamp: u64,
    ) -> Self {
        Self {
            room_id,
            target_event_id,
            key,
            count: 1,
            first_timestamp,
        }
    }
}
