//! Memory-based storage implementation of the EventStorage trait

use thread_storage_traits::events::EventStorage;
use thread_storage_traits::events::types::{DecryptionOutcome, EventRecord};
use thread_storage_traits::{EventId, RoomId, ThreadStorageError};

use crate::ThreadMemoryStorage;

impl EventStorage for ThreadMemoryStorage {
    fn find_event(
        &self,
        room_id: &RoomId,
        event_id: &EventId,
    ) -> Result<Option<EventRecord>, ThreadStorageError> {
        let inner = self.inner.read();
        Ok(inner
            .events
            .get(&(room_id.clone(), event_id.clone()))
            .cloned())
    }

    fn insert_event(&self, record: EventRecord) -> Result<bool, ThreadStorageError> {
        let mut inner = self.inner.write();
        let key = (record.room_id.clone(), record.event_id.clone());
        if inner.events.contains_key(&key) {
            return Ok(false);
        }
        inner.events.insert(key, record);
        Ok(true)
    }

    fn save_timeline_event(&self, record: EventRecord) -> Result<(), ThreadStorageError> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let room_id = record.room_id.clone();
        let event_id = record.event_id.clone();
        inner
            .events
            .entry((room_id.clone(), event_id.clone()))
            .or_insert(record);

        let timeline = inner.room_timelines.entry(room_id).or_default();
        if !timeline.contains(&event_id) {
            timeline.push(event_id);
        }
        Ok(())
    }

    fn room_timeline(&self, room_id: &RoomId) -> Result<Vec<EventRecord>, ThreadStorageError> {
        let inner = self.inner.read();
        let Some(timeline) = inner.room_timelines.get(room_id) else {
            return Ok(Vec::new());
        };
        Ok(timeline
            .iter()
            .filter_map(|event_id| inner.events.get(&(room_id.clone(), event_id.clone())))
            .cloned()
            .collect())
    }

    fn set_event_decryption(
        &self,
        room_id: &RoomId,
        event_id: &EventId,
        outcome: DecryptionOutcome,
    ) -> Result<(), ThreadStorageError> {
        let mut inner = self.inner.write();
        let record = inner
            .events
            .get_mut(&(room_id.clone(), event_id.clone()))
            .ok_or_else(|| ThreadStorageError::NotFound(format!("event {event_id}")))?;
        record.decryption = Some(outcome);
        Ok(())
    }

    fn event_count(&self, room_id: &RoomId) -> Result<usize, ThreadStorageError> {
        let inner = self.inner.read();
        Ok(inner
            .events
            .keys()
            .filter(|(room, _)| room == room_id)
            .count())
    }
}
