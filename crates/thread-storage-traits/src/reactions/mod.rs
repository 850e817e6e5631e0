//! Reactions module
//!
//! Reaction aggregates keyed by `(room_id, target_event_id, key)`.

pub mod types;

use crate::error::ThreadStorageError;
use crate::ids::{EventId, RoomId};

use self::types::ReactionAggregate;

/// Storage traits for the reactions module
pub trait ReactionStorage {
    /// Find the aggregate of one reaction key on one event
    fn find_reaction(
        &self,
        room_id: &RoomId,
        target_event_id: &EventId,
        key: &str,
    ) -> Result<Option<ReactionAggregate>, ThreadStorageError>;

    /// All aggregates on one event, in first-seen order
    fn reactions_for_event(
        &self,
        room_id: &RoomId,
        target_event_id: &EventId,
    ) -> Result<Vec<ReactionAggregate>, ThreadStorageError>;
}
