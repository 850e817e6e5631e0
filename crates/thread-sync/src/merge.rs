//! Thread page merging
//!
//! Folds pages from the relations API into the thread's [`ThreadChunk`].
//! Every reply goes through one [`EventLookup`]: already in the chunk (skip),
//! already in the event store (attach the existing record) or unknown
//! (materialize a new record). A page is committed in a single transaction
//! together with the chunk's new `prev_token`, so replaying a page after a
//! failure is harmless.

use thread_storage_traits::chunks::types::ThreadChunk;
use thread_storage_traits::events::types::{EventIdentity, EventRecord, RawEvent, SendState};
use thread_storage_traits::{
    Cursor, EventId, RoomId, StorageTransaction, ThreadStorageError, ThreadStorageProvider,
};

use crate::api::{RelationsRequest, ThreadsApi};
use crate::reactions::apply_inline_annotations;
use crate::util::{SenderCache, now_ms};
use crate::{Result, ThreadSync};

/// What the caller should do after a page merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continuation {
    /// Older replies remain; merge again from the chunk's new `prev_token`
    ShouldFetchMore,
    /// The oldest page was merged
    ReachedEnd,
    /// The thread has no chunk. Nothing was fetched or written.
    NoChunk,
}

impl Continuation {
    /// Whether another page should be merged
    pub fn should_fetch_more(&self) -> bool {
        matches!(self, Self::ShouldFetchMore)
    }
}

/// Where an incoming event stands relative to a chunk and the event store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventLookup {
    /// Already referenced by the chunk
    InChunk,
    /// Stored (e.g. by main timeline sync) but not referenced by the chunk
    Existing,
    /// Unknown to the event store
    New,
}

impl EventLookup {
    /// Classifies `event_id`. `is_stored` is only consulted when the chunk
    /// doesn't already reference the event.
    pub fn classify<F, E>(chunk: &ThreadChunk, event_id: &EventId, is_stored: F) -> Result<Self, E>
    where
        F: FnOnce() -> Result<bool, E>,
    {
        if chunk.contains(event_id) {
            return Ok(Self::InChunk);
        }
        if is_stored()? {
            Ok(Self::Existing)
        } else {
            Ok(Self::New)
        }
    }
}

/// Result of [`ThreadSync::paginate_thread`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadPagination {
    /// Number of pages merged
    pub pages: usize,
    /// Continuation returned by the last merge
    pub continuation: Continuation,
}

/// Per-page state threaded through the transaction
struct PageContext<'a> {
    room_id: &'a RoomId,
    root_event_id: &'a EventId,
    chunk: ThreadChunk,
    senders: SenderCache,
    now_ms: u64,
}

impl<Storage, Api> ThreadSync<Storage, Api>
where
    Storage: ThreadStorageProvider,
    Api: ThreadsApi,
{
    /// Merges one page of replies into the chunk of `root_event_id`.
    ///
    /// `limit` defaults to [`ThreadSyncConfig::relations_page_limit`](crate::ThreadSyncConfig).
    ///
    /// Returns [`Continuation::ReachedEnd`] exactly when the page has no next
    /// cursor. On that page the root event is appended to the chunk if it is
    /// known, after the replies.
    ///
    /// # Errors
    ///
    /// Transport and storage failures abort the call before anything of the
    /// page is committed.
    pub async fn merge_thread_page(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
        from: Option<Cursor>,
        limit: Option<u32>,
    ) -> Result<Continuation> {
        if self
            .storage()
            .find_thread_chunk(room_id, root_event_id)?
            .is_none()
        {
            self.report_missing_chunk(room_id, root_event_id);
            return Ok(Continuation::NoChunk);
        }

        let request = RelationsRequest {
            room_id: room_id.clone(),
            root_event_id: root_event_id.clone(),
            from,
            limit: limit.unwrap_or(self.config.relations_page_limit),
        };
        let page = self.api().fetch_relations(request).await?;
        let has_reached_end = page.next_cursor.is_none();

        tracing::debug!(
            target: "thread_sync::merge::merge_thread_page",
            room_id = %room_id,
            root_event_id = %root_event_id,
            events = page.events.len(),
            has_reached_end,
            "Merging thread page"
        );

        // `None`: the chunk vanished while the page was in flight.
        let committed: Option<bool> = self.storage().transaction(|tx| {
            let Some(chunk) = tx.find_chunk(room_id, root_event_id)? else {
                return Ok::<_, ThreadStorageError>(None);
            };
            let mut ctx = PageContext {
                room_id,
                root_event_id,
                chunk,
                senders: SenderCache::new(),
                now_ms: now_ms(),
            };

            tx.set_prev_token(room_id, root_event_id, page.next_cursor.clone())?;

            for raw in &page.events {
                let Some(identity) = raw.identity() else {
                    tracing::warn!(
                        target: "thread_sync::merge::merge_thread_page",
                        root_event_id = %root_event_id,
                        "Skipping reply without event id, sender or type"
                    );
                    continue;
                };
                self.merge_event(tx, &mut ctx, identity, raw)?;
            }

            if !has_reached_end {
                return Ok(Some(true));
            }
            self.resolve_root(tx, &mut ctx, page.root_event.as_ref())
                .map(Some)
        })?;

        match committed {
            None => {
                self.report_missing_chunk(room_id, root_event_id);
                Ok(Continuation::NoChunk)
            }
            Some(root_resolved) => {
                if !root_resolved {
                    tracing::warn!(
                        target: "thread_sync::merge::merge_thread_page",
                        room_id = %room_id,
                        root_event_id = %root_event_id,
                        "Reached the start of the thread but its root is unknown"
                    );
                    if let Some(callback) = &self.callback {
                        callback.on_root_unresolved(room_id, root_event_id);
                    }
                }

                if has_reached_end {
                    Ok(Continuation::ReachedEnd)
                } else {
                    Ok(Continuation::ShouldFetchMore)
                }
            }
        }
    }

    /// Merges pages of `root_event_id`, starting from the chunk's current
    /// `prev_token`, until the start of the thread is reached.
    ///
    /// Stops early after [`ThreadSyncConfig::max_pages_per_pagination`](crate::ThreadSyncConfig)
    /// pages; the returned continuation then still asks for more.
    pub async fn paginate_thread(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<ThreadPagination> {
        let mut pages = 0;
        loop {
            let from = match self.storage().find_thread_chunk(room_id, root_event_id)? {
                Some(chunk) => chunk.prev_token,
                None => None,
            };

            let continuation = self
                .merge_thread_page(room_id, root_event_id, from, None)
                .await?;
            if continuation != Continuation::NoChunk {
                pages += 1;
            }

            if !continuation.should_fetch_more() || pages >= self.config.max_pages_per_pagination {
                return Ok(ThreadPagination {
                    pages,
                    continuation,
                });
            }
        }
    }

    fn merge_event(
        &self,
        tx: &mut dyn StorageTransaction,
        ctx: &mut PageContext<'_>,
        identity: EventIdentity,
        raw: &RawEvent,
    ) -> Result<(), ThreadStorageError> {
        let room_id = ctx.room_id;
        let lookup = EventLookup::classify(&ctx.chunk, &identity.event_id, || {
            tx.find_event(room_id, &identity.event_id)
                .map(|record| record.is_some())
        })?;

        tracing::trace!(
            target: "thread_sync::merge::merge_event",
            event_id = %identity.event_id,
            ?lookup,
            "Classified thread event"
        );

        match lookup {
            EventLookup::InChunk => Ok(()),
            EventLookup::Existing => self.append(tx, ctx, identity.event_id),
            EventLookup::New => {
                let record = self.materialize(tx, ctx, identity, raw)?;
                let event_id = record.event_id.clone();
                tx.insert_event(record)?;
                self.append(tx, ctx, event_id)
            }
        }
    }

    /// Appends the root on the oldest page. Returns `false` if the root is
    /// neither stored nor usable from the response.
    fn resolve_root(
        &self,
        tx: &mut dyn StorageTransaction,
        ctx: &mut PageContext<'_>,
        root_event: Option<&RawEvent>,
    ) -> Result<bool, ThreadStorageError> {
        let root_event_id = ctx.root_event_id;

        if tx.find_event(ctx.room_id, root_event_id)?.is_some() {
            self.append(tx, ctx, root_event_id.clone())?;
            return Ok(true);
        }

        if let Some(raw) = root_event
            && let Some(identity) = raw.identity()
            && &identity.event_id == root_event_id
        {
            let record = self.materialize(tx, ctx, identity, raw)?;
            tx.insert_event(record)?;
            self.append(tx, ctx, root_event_id.clone())?;
            return Ok(true);
        }

        Ok(false)
    }

    fn append(
        &self,
        tx: &mut dyn StorageTransaction,
        ctx: &mut PageContext<'_>,
        event_id: EventId,
    ) -> Result<(), ThreadStorageError> {
        if tx.append_to_chunk(ctx.room_id, ctx.root_event_id, event_id.clone())? {
            ctx.chunk.append(event_id);
        }
        Ok(())
    }

    /// Builds a new record with its sender snapshot, decryption outcome and
    /// reaction keys. Reaction aggregates are written through `tx`.
    fn materialize(
        &self,
        tx: &mut dyn StorageTransaction,
        ctx: &mut PageContext<'_>,
        identity: EventIdentity,
        raw: &RawEvent,
    ) -> Result<EventRecord, ThreadStorageError> {
        let mut record = EventRecord::from_raw(
            ctx.room_id.clone(),
            identity,
            raw,
            SendState::Synced,
            ctx.now_ms,
        );

        let room_id = ctx.room_id;
        record.sender_profile = ctx.senders.get_or_resolve(&record.sender, |user_id| {
            tx.find_member_snapshot(room_id, user_id)
        })?;
        self.decrypt_if_needed(&mut record, raw);
        record.reaction_keys = apply_inline_annotations(tx, room_id, raw)?;

        Ok(record)
    }

    fn report_missing_chunk(&self, room_id: &RoomId, root_event_id: &EventId) {
        tracing::warn!(
            target: "thread_sync::merge::merge_thread_page",
            room_id = %room_id,
            root_event_id = %root_event_id,
            "No thread chunk, skipping page merge"
        );
        if let Some(callback) = &self.callback {
            callback.on_missing_chunk(room_id, root_event_id);
        }
    }
}
