//! Journaled transactions over the in-memory stores.
//!
//! A [`MemoryTransaction`] reads through its own [`Journal`] first and the
//! committed stores second. Nothing reaches the stores until
//! [`Journal::apply`] runs under the write lock.

use std::collections::HashMap;

use thread_storage_traits::chunks::types::ThreadChunk;
use thread_storage_traits::events::types::EventRecord;
use thread_storage_traits::members::types::MemberSnapshot;
use thread_storage_traits::reactions::types::ReactionAggregate;
use thread_storage_traits::summaries::types::ThreadSummary;
use thread_storage_traits::{
    Cursor, EventId, RoomId, StorageTransaction, ThreadStorageError, UserId,
};

use crate::{ReactionKey, ThreadKey, ThreadMemoryStorageInner};

/// Pending writes of one transaction
#[derive(Default)]
pub(crate) struct Journal {
    events: HashMap<ThreadKey, EventRecord>,
    chunks: HashMap<ThreadKey, ThreadChunk>,
    reactions: HashMap<ReactionKey, ReactionAggregate>,
    summaries: HashMap<ThreadKey, ThreadSummary>,
}

impl Journal {
    /// Apply every pending write to the committed stores
    pub(crate) fn apply(self, inner: &mut ThreadMemoryStorageInner) {
        for (key, record) in self.events {
            inner.events.entry(key).or_insert(record);
        }
        inner.chunks.extend(self.chunks);
        inner.reactions.extend(self.reactions);
        inner.summaries.extend(self.summaries);
    }
}

/// A transaction over a locked [`ThreadMemoryStorageInner`]
pub(crate) struct MemoryTransaction<'a> {
    base: &'a ThreadMemoryStorageInner,
    journal: Journal,
}

impl<'a> MemoryTransaction<'a> {
    pub(crate) fn new(base: &'a ThreadMemoryStorageInner) -> Self {
        Self {
            base,
            journal: Journal::default(),
        }
    }

    pub(crate) fn into_journal(self) -> Journal {
        self.journal
    }

    /// Copy-on-write access to a chunk
    fn chunk_mut(
        &mut self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<&mut ThreadChunk, ThreadStorageError> {
        let key = (room_id.clone(), root_event_id.clone());
        if !self.journal.chunks.contains_key(&key) {
            let committed = self.base.chunks.get(&key).cloned().ok_or_else(|| {
                ThreadStorageError::NotFound(format!(
                    "thread chunk {root_event_id} in {room_id}"
                ))
            })?;
            self.journal.chunks.insert(key.clone(), committed);
        }
        self.journal
            .chunks
            .get_mut(&key)
            .ok_or_else(|| ThreadStorageError::Database("journal chunk vanished".to_string()))
    }
}

impl StorageTransaction for MemoryTransaction<'_> {
    fn find_event(
        &self,
        room_id: &RoomId,
        event_id: &EventId,
    ) -> Result<Option<EventRecord>, ThreadStorageError> {
        let key = (room_id.clone(), event_id.clone());
        Ok(self
            .journal
            .events
            .get(&key)
            .or_else(|| self.base.events.get(&key))
            .cloned())
    }

    fn insert_event(&mut self, record: EventRecord) -> Result<bool, ThreadStorageError> {
        let key = (record.room_id.clone(), record.event_id.clone());
        if self.base.events.contains_key(&key) || self.journal.events.contains_key(&key) {
            return Ok(false);
        }
        self.journal.events.insert(key, record);
        Ok(true)
    }

    fn find_chunk(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Option<ThreadChunk>, ThreadStorageError> {
        let key = (room_id.clone(), root_event_id.clone());
        Ok(self
            .journal
            .chunks
            .get(&key)
            .or_else(|| self.base.chunks.get(&key))
            .cloned())
    }

    fn append_to_chunk(
        &mut self,
        room_id: &RoomId,
        root_event_id: &EventId,
        event_id: EventId,
    ) -> Result<bool, ThreadStorageError> {
        let chunk = self.chunk_mut(room_id, root_event_id)?;
        Ok(chunk.append(event_id))
    }

    fn set_prev_token(
        &mut self,
        room_id: &RoomId,
        root_event_id: &EventId,
        prev_token: Option<Cursor>,
    ) -> Result<(), ThreadStorageError> {
        let chunk = self.chunk_mut(room_id, root_event_id)?;
        chunk.prev_token = prev_token;
        Ok(())
    }

    fn find_member_snapshot(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<Option<MemberSnapshot>, ThreadStorageError> {
        Ok(self
            .base
            .members
            .peek(&(room_id.clone(), user_id.clone()))
            .cloned())
    }

    fn find_reaction(
        &self,
        room_id: &RoomId,
        target_event_id: &EventId,
        key: &str,
    ) -> Result<Option<ReactionAggregate>, ThreadStorageError> {
        let key = (room_id.clone(), target_event_id.clone(), key.to_owned());
        Ok(self
            .journal
            .reactions
            .get(&key)
            .or_else(|| self.base.reactions.get(&key))
            .cloned())
    }

    fn save_reaction(&mut self, aggregate: ReactionAggregate) -> Result<(), ThreadStorageError> {
        let key = (
            aggregate.room_id.clone(),
            aggregate.target_event_id.clone(),
            aggregate.key.clone(),
        );
        self.journal.reactions.insert(key, aggregate);
        Ok(())
    }

    fn find_thread_summary(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Option<ThreadSummary>, ThreadStorageError> {
        let key = (room_id.clone(), root_event_id.clone());
        Ok(self
            .journal
            .summaries
            .get(&key)
            .or_else(|| self.base.summaries.get(&key))
            .cloned())
    }

    fn save_thread_summary(&mut self, summary: ThreadSummary) -> Result<(), ThreadStorageError> {
        let key = (summary.room_id.clone(), summary.root_event_id.clone());
        self.journal.summaries.insert(key, summary);
        Ok(())
    }
}
