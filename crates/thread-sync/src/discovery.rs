//! Thread discovery
//!
//! Enumerates the thread roots of a room through the room messages API and
//! overwrites their [`ThreadSummary`]. Live replies update existing summaries
//! incrementally through [`ThreadSync::apply_live_thread_reply`].

use thread_storage_traits::events::types::{EventIdentity, EventRecord, RawEvent, SendState};
use thread_storage_traits::members::types::MemberSnapshot;
use thread_storage_traits::summaries::types::{ThreadSummary, ThreadSummaryUpdateKind};
use thread_storage_traits::{
    Cursor, EventId, RoomId, StorageTransaction, ThreadStorageError, ThreadStorageProvider,
    UserId,
};

use crate::api::{Direction, RoomEventFilter, RoomMessagesRequest, ThreadsApi};
use crate::util::{SenderCache, now_ms};
use crate::{Result, ThreadSync};

/// Options of one discovery call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Where to start; `None` starts from the most recent thread
    pub from: Option<Cursor>,
    /// Page size. Defaults to [`ThreadSyncConfig::discovery_page_limit`](crate::ThreadSyncConfig).
    pub limit: Option<u32>,
    /// Only discover threads this user took part in
    pub participant: Option<UserId>,
}

/// Successful result of one discovery call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    /// Cursor of the next page; `None` when every thread root was returned
    pub next_cursor: Option<Cursor>,
    /// Roots whose summary was written, in server order
    pub updated: Vec<EventId>,
}

impl<Storage, Api> ThreadSync<Storage, Api>
where
    Storage: ThreadStorageProvider,
    Api: ThreadsApi,
{
    /// Fetches one backward page of thread roots and overwrites their
    /// summaries.
    ///
    /// Roots without an event id, a sender or a type are skipped. No
    /// pagination loop is run: pass `next_cursor` back in to continue.
    ///
    /// # Errors
    ///
    /// A transport failure is returned unmodified and nothing is written.
    pub async fn discover_threads(
        &self,
        room_id: &RoomId,
        options: DiscoveryOptions,
    ) -> Result<DiscoveryOutcome> {
        let filter = RoomEventFilter::thread_roots(options.participant.as_ref()).to_json()?;
        let request = RoomMessagesRequest {
            room_id: room_id.clone(),
            from: options.from,
            direction: Direction::Backward,
            limit: options.limit.unwrap_or(self.config.discovery_page_limit),
            filter: Some(filter),
        };
        let page = self.api().fetch_room_messages(request).await?;

        tracing::debug!(
            target: "thread_sync::discovery::discover_threads",
            room_id = %room_id,
            roots = page.events.len(),
            has_next = page.next_cursor.is_some(),
            "Discovered thread roots"
        );

        let updated = self.storage().transaction(|tx| {
            let mut senders = SenderCache::new();
            let now = now_ms();
            let mut updated = Vec::with_capacity(page.events.len());

            for raw in &page.events {
                let Some(identity) = raw.identity() else {
                    tracing::warn!(
                        target: "thread_sync::discovery::discover_threads",
                        room_id = %room_id,
                        "Skipping thread root without event id, sender or type"
                    );
                    continue;
                };

                let summary = self.replace_summary(&*tx, &mut senders, room_id, identity, raw, now)?;
                updated.push(summary.root_event_id.clone());
                tx.save_thread_summary(summary)?;
            }

            Ok::<_, ThreadStorageError>(updated)
        })?;

        Ok(DiscoveryOutcome {
            next_cursor: page.next_cursor,
            updated,
        })
    }

    /// Updates the summary of the thread `reply` belongs to.
    ///
    /// With a summary in place, the reply becomes its latest event and the
    /// reply count grows by one. Without a summary but with the root in the
    /// event store, a summary counting this one reply is created. Returns the
    /// written summary, or `None` if nothing was written.
    pub fn apply_live_thread_reply(
        &self,
        room_id: &RoomId,
        reply: &RawEvent,
    ) -> Result<Option<ThreadSummary>> {
        let Some(identity) = reply.identity() else {
            tracing::warn!(
                target: "thread_sync::discovery::apply_live_thread_reply",
                room_id = %room_id,
                "Skipping live reply without event id, sender or type"
            );
            return Ok(None);
        };
        let Some(root_event_id) = reply.thread_root_id() else {
            return Ok(None);
        };
        let by_local_user = identity.sender == self.user_id;

        let written = self.storage().transaction(|tx| {
            let latest_sender = tx.find_member_snapshot(room_id, &identity.sender)?;
            let latest_event = match tx.find_event(room_id, &identity.event_id)? {
                Some(record) => record,
                None => {
                    let mut record = EventRecord::from_raw(
                        room_id.clone(),
                        identity.clone(),
                        reply,
                        SendState::Synced,
                        now_ms(),
                    );
                    record.sender_profile = latest_sender.clone();
                    self.decrypt_if_needed(&mut record, reply);
                    record
                }
            };

            let summary = match tx.find_thread_summary(room_id, &root_event_id)? {
                Some(summary)
                    if summary
                        .latest_event
                        .as_ref()
                        .is_some_and(|latest| latest.event_id == identity.event_id) =>
                {
                    // Already counted.
                    return Ok::<_, ThreadStorageError>(None);
                }
                Some(mut summary) => {
                    summary.latest_event = Some(latest_event);
                    summary.latest_sender = latest_sender;
                    summary.reply_count = Some(summary.reply_count.unwrap_or(0).saturating_add(1));
                    summary.is_user_participating |= by_local_user;
                    summary.update_kind = ThreadSummaryUpdateKind::Add;
                    summary
                }
                None => {
                    let Some(root_event) = tx.find_event(room_id, &root_event_id)? else {
                        return Ok(None);
                    };
                    let root_sender = tx.find_member_snapshot(room_id, &root_event.sender)?;
                    ThreadSummary {
                        room_id: room_id.clone(),
                        root_event_id: root_event_id.clone(),
                        root_event,
                        root_sender,
                        latest_event: Some(latest_event),
                        latest_sender,
                        reply_count: Some(1),
                        is_user_participating: by_local_user,
                        update_kind: ThreadSummaryUpdateKind::Add,
                    }
                }
            };

            tx.save_thread_summary(summary.clone())?;
            Ok(Some(summary))
        })?;

        tracing::debug!(
            target: "thread_sync::discovery::apply_live_thread_reply",
            room_id = %room_id,
            root_event_id = %root_event_id,
            updated = written.is_some(),
            "Applied live thread reply"
        );

        Ok(written)
    }

    /// Builds the full-replace summary of one thread root
    fn replace_summary(
        &self,
        tx: &dyn StorageTransaction,
        senders: &mut SenderCache,
        room_id: &RoomId,
        identity: EventIdentity,
        raw: &RawEvent,
        now_ms: u64,
    ) -> Result<ThreadSummary, ThreadStorageError> {
        let root_is_local = identity.sender == self.user_id;
        let root_sender = senders.get_or_resolve(&identity.sender, |user_id| {
            tx.find_member_snapshot(room_id, user_id)
        })?;
        let root_event = self.snapshot(room_id, identity, raw, root_sender.clone(), now_ms);

        let thread = raw.latest_thread();
        let latest = thread
            .and_then(|thread| thread.latest_event.as_deref())
            .and_then(|latest| Some((latest.identity()?, latest)));

        let (latest_event, latest_sender) = match latest {
            Some((latest_identity, latest_raw)) => {
                let sender = senders.get_or_resolve(&latest_identity.sender, |user_id| {
                    tx.find_member_snapshot(room_id, user_id)
                })?;
                let record =
                    self.snapshot(room_id, latest_identity, latest_raw, sender.clone(), now_ms);
                (Some(record), sender)
            }
            None => (None, None),
        };

        let participated = thread
            .and_then(|thread| thread.current_user_participated)
            .unwrap_or(false);

        Ok(ThreadSummary {
            room_id: room_id.clone(),
            root_event_id: root_event.event_id.clone(),
            root_event,
            root_sender,
            latest_event,
            latest_sender,
            reply_count: thread.and_then(|thread| thread.count),
            is_user_participating: participated || root_is_local,
            update_kind: ThreadSummaryUpdateKind::Replace,
        })
    }

    /// A decrypted copy of a wire event for a summary. Not stored as an event.
    fn snapshot(
        &self,
        room_id: &RoomId,
        identity: EventIdentity,
        raw: &RawEvent,
        sender: Option<MemberSnapshot>,
        now_ms: u64,
    ) -> EventRecord {
        let mut record =
            EventRecord::from_raw(room_id.clone(), identity, raw, SendState::Synced, now_ms);
        record.sender_profile = sender;
        self.decrypt_if_needed(&mut record, raw);
        record
    }
}
