//! Memory-based storage implementation of the ReactionStorage trait

use thread_storage_traits::reactions::ReactionStorage;
use thread_storage_traits::reactions::types::ReactionAggregate;
use thread_storage_traits::{EventId, RoomId, ThreadStorageError};

use crate::ThreadMemoryStorage;

impl ReactionStorage for ThreadMemoryStorage {
    fn find_reaction(
        &self,
        room_id: &RoomId,
        target_event_id: &EventId,
        key: &str,
    ) -> Result<Option<ReactionAggregate>, ThreadStorageError> {
        let inner = self.inner.read();
        Ok(inner
            .reactions
            .get(&(room_id.clone(), target_event_id.clone(), key.to_string()))
            .cloned())
    }

    fn reactions_for_event(
        &self,
        room_id: &RoomId,
        target_event_id: &EventId,
    ) -> Result<Vec<ReactionAggregate>, ThreadStorageError> {
        let inner = self.inner.read();
        let mut aggregates: Vec<ReactionAggregate> = inner
            .reactions
            .values()
            .filter(|a| &a.room_id == room_id && &a.target_event_id == target_event_id)
            .cloned()
            .collect();

        aggregates.sort_by(|a, b| {
            a.first_timestamp
                .cmp(&b.first_timestamp)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(aggregates)
    }
}
