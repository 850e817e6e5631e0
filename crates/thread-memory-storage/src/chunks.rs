//! Memory-based storage implementation of the ChunkStorage trait

use thread_storage_traits::chunks::ChunkStorage;
use thread_storage_traits::chunks::types::ThreadChunk;
use thread_storage_traits::events::types::EventRecord;
use thread_storage_traits::{EventId, RoomId, ThreadStorageError};

use crate::ThreadMemoryStorage;

impl ChunkStorage for ThreadMemoryStorage {
    fn create_thread_chunk(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<ThreadChunk, ThreadStorageError> {
        let mut inner = self.inner.write();
        let chunk = inner
            .chunks
            .entry((room_id.clone(), root_event_id.clone()))
            .or_insert_with(|| ThreadChunk::new(room_id.clone(), root_event_id.clone()));
        Ok(chunk.clone())
    }

    fn find_thread_chunk(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Option<ThreadChunk>, ThreadStorageError> {
        let inner = self.inner.read();
        Ok(inner
            .chunks
            .get(&(room_id.clone(), root_event_id.clone()))
            .cloned())
    }

    fn thread_chunk_events(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Vec<EventRecord>, ThreadStorageError> {
        let inner = self.inner.read();
        let chunk = inner
            .chunks
            .get(&(room_id.clone(), root_event_id.clone()))
            .ok_or_else(|| {
                ThreadStorageError::NotFound(format!("thread chunk {root_event_id} in {room_id}"))
            })?;

        Ok(chunk
            .event_ids()
            .iter()
            .filter_map(|event_id| inner.events.get(&(room_id.clone(), event_id.clone())))
            .cloned()
            .collect())
    }

    fn delete_thread_chunk(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<bool, ThreadStorageError> {
        let mut inner = self.inner.write();
        Ok(inner
            .chunks
            .remove(&(room_id.clone(), root_event_id.clone()))
            .is_some())
    }
}
