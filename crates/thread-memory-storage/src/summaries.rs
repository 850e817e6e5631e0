//! Memory-based storage implementation of the ThreadSummaryStorage trait

use thread_storage_traits::summaries::ThreadSummaryStorage;
use thread_storage_traits::summaries::types::ThreadSummary;
use thread_storage_traits::{EventId, RoomId, ThreadStorageError};

use crate::ThreadMemoryStorage;

impl ThreadSummaryStorage for ThreadMemoryStorage {
    fn save_thread_summary(&self, summary: ThreadSummary) -> Result<(), ThreadStorageError> {
        let mut inner = self.inner.write();
        inner.summaries.insert(
            (summary.room_id.clone(), summary.root_event_id.clone()),
            summary,
        );
        Ok(())
    }

    fn find_thread_summary(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Option<ThreadSummary>, ThreadStorageError> {
        let inner = self.inner.read();
        Ok(inner
            .summaries
            .get(&(room_id.clone(), root_event_id.clone()))
            .cloned())
    }

    fn thread_summaries(&self, room_id: &RoomId) -> Result<Vec<ThreadSummary>, ThreadStorageError> {
        let inner = self.inner.read();
        let mut summaries: Vec<ThreadSummary> = inner
            .summaries
            .values()
            .filter(|s| &s.room_id == room_id)
            .cloned()
            .collect();
        summaries.sort_by(|a, b| a.list_order_cmp(b));
        Ok(summaries)
    }
}
