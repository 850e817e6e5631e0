//! Test utilities for the thread-sync crate
//!
//! A scripted [`MockThreadsApi`], a [`ScriptedDecryptor`], a
//! [`RecordingCallback`] and builders for wire events.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use thread_memory_storage::ThreadMemoryStorage;
use thread_storage_traits::chunks::ChunkStorage;
use thread_storage_traits::events::types::{
    ClearContent, DecryptionError, DecryptionOutcome, EventRecord, RawEvent, SendState,
};
use thread_storage_traits::{Cursor, EventId, RoomId, UserId};

use crate::ThreadSync;
use crate::api::{
    PaginatedMessages, PaginatedRelations, RelationsRequest, RoomMessagesRequest, ThreadsApi,
    TransportError,
};
use crate::callback::ThreadSyncCallback;
use crate::decryption::EventDecryptor;

pub const ALICE: &str = "@alice:example.org";
pub const BOB: &str = "@bob:example.org";
pub const CAROL: &str = "@carol:example.org";
pub const ME: &str = "@me:example.org";

pub type TestSync = ThreadSync<ThreadMemoryStorage, MockThreadsApi>;

pub fn room() -> RoomId {
    RoomId::from("!threads:example.org")
}

pub fn me() -> UserId {
    UserId::from(ME)
}

/// Installs a test subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn raw(value: Value) -> RawEvent {
    serde_json::from_value(value).expect("valid raw event")
}

/// A plain thread root
pub fn root_event(event_id: &str, sender: &str, ts: u64) -> RawEvent {
    raw(json!({
        "event_id": event_id,
        "sender": sender,
        "type": "m.room.message",
        "origin_server_ts": ts,
        "content": { "msgtype": "m.text", "body": format!("root {event_id}") }
    }))
}

/// A thread root carrying the server's `m.thread` aggregation
pub fn thread_root(
    event_id: &str,
    sender: &str,
    ts: u64,
    latest: Option<RawEvent>,
    count: u32,
    current_user_participated: bool,
) -> RawEvent {
    let mut thread = json!({
        "count": count,
        "current_user_participated": current_user_participated
    });
    if let Some(latest) = latest {
        thread["latest_event"] = serde_json::to_value(latest).expect("serializable event");
    }

    let mut root = serde_json::to_value(root_event(event_id, sender, ts)).expect("serializable");
    root["unsigned"] = json!({ "m.relations": { "m.thread": thread } });
    raw(root)
}

/// A cleartext reply in the thread of `root_id`
pub fn reply(event_id: &str, root_id: &str, sender: &str, ts: u64) -> RawEvent {
    raw(json!({
        "event_id": event_id,
        "sender": sender,
        "type": "m.room.message",
        "origin_server_ts": ts,
        "content": {
            "msgtype": "m.text",
            "body": format!("reply {event_id}"),
            "m.relates_to": { "rel_type": "m.thread", "event_id": root_id }
        }
    }))
}

/// An encrypted reply in the thread of `root_id`
pub fn encrypted_reply(event_id: &str, root_id: &str, sender: &str, ts: u64) -> RawEvent {
    raw(json!({
        "event_id": event_id,
        "sender": sender,
        "type": "m.room.encrypted",
        "origin_server_ts": ts,
        "content": {
            "algorithm": "m.megolm.v1.aes-sha2",
            "ciphertext": "AwgAEpAB",
            "session_id": "session",
            "m.relates_to": { "rel_type": "m.thread", "event_id": root_id }
        }
    }))
}

/// An event carrying inline reaction annotations
pub fn with_reactions(event_id: &str, ts: u64, reactions: &[(&str, u32)]) -> RawEvent {
    let chunk: Vec<Value> = reactions
        .iter()
        .map(|(key, count)| json!({ "type": "m.reaction", "key": key, "count": count }))
        .collect();
    raw(json!({
        "event_id": event_id,
        "sender": ALICE,
        "type": "m.room.message",
        "origin_server_ts": ts,
        "content": { "body": "reacted to" },
        "unsigned": { "m.relations": { "m.annotation": { "chunk": chunk } } }
    }))
}

pub fn relations_page(events: Vec<RawEvent>, next_cursor: Option<&str>) -> PaginatedRelations {
    PaginatedRelations {
        events,
        root_event: None,
        next_cursor: next_cursor.map(Cursor::from),
    }
}

pub fn messages_page(events: Vec<RawEvent>, next_cursor: Option<&str>) -> PaginatedMessages {
    PaginatedMessages {
        events,
        next_cursor: next_cursor.map(Cursor::from),
    }
}

/// A record as the main timeline would store it
pub fn timeline_record(event: &RawEvent) -> EventRecord {
    EventRecord::from_raw(
        room(),
        event.identity().expect("valid event"),
        event,
        SendState::Sent,
        0,
    )
}

pub fn decrypted(body: &str) -> DecryptionOutcome {
    DecryptionOutcome::Decrypted(ClearContent {
        event_type: "m.room.message".to_string(),
        content: json!({ "msgtype": "m.text", "body": body }),
        sender_key: None,
    })
}

/// Engine over memory storage with an empty chunk for `root_id`
pub fn sync_with_chunk(api: MockThreadsApi, root_id: &str) -> TestSync {
    let storage = ThreadMemoryStorage::default();
    storage
        .create_thread_chunk(&room(), &EventId::from(root_id))
        .expect("chunk created");
    ThreadSync::new(storage, api, me())
}

#[derive(Debug, Default)]
struct MockState {
    relations: HashMap<(EventId, Option<Cursor>), PaginatedRelations>,
    messages: HashMap<Option<Cursor>, PaginatedMessages>,
    failure: Option<TransportError>,
    relations_requests: Vec<RelationsRequest>,
    messages_requests: Vec<RoomMessagesRequest>,
}

/// [`ThreadsApi`] answering from scripted pages keyed by cursor
#[derive(Debug, Default)]
pub struct MockThreadsApi {
    state: Mutex<MockState>,
}

impl MockThreadsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_relations_page(&self, root_id: &str, from: Option<&str>, page: PaginatedRelations) {
        self.state
            .lock()
            .unwrap()
            .relations
            .insert((EventId::from(root_id), from.map(Cursor::from)), page);
    }

    pub fn add_messages_page(&self, from: Option<&str>, page: PaginatedMessages) {
        self.state
            .lock()
            .unwrap()
            .messages
            .insert(from.map(Cursor::from), page);
    }

    /// Makes the next request of either kind fail with `error`
    pub fn fail_next(&self, error: TransportError) {
        self.state.lock().unwrap().failure = Some(error);
    }

    pub fn relations_requests(&self) -> Vec<RelationsRequest> {
        self.state.lock().unwrap().relations_requests.clone()
    }

    pub fn messages_requests(&self) -> Vec<RoomMessagesRequest> {
        self.state.lock().unwrap().messages_requests.clone()
    }
}

fn not_scripted(what: &str) -> TransportError {
    TransportError::Status {
        status: 404,
        errcode: Some("M_NOT_FOUND".to_string()),
        message: format!("no scripted {what} page"),
    }
}

#[async_trait]
impl ThreadsApi for MockThreadsApi {
    async fn fetch_room_messages(
        &self,
        request: RoomMessagesRequest,
    ) -> Result<PaginatedMessages, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.messages_requests.push(request.clone());
        if let Some(error) = state.failure.take() {
            return Err(error);
        }
        state
            .messages
            .get(&request.from)
            .cloned()
            .ok_or_else(|| not_scripted("messages"))
    }

    async fn fetch_relations(
        &self,
        request: RelationsRequest,
    ) -> Result<PaginatedRelations, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.relations_requests.push(request.clone());
        if let Some(error) = state.failure.take() {
            return Err(error);
        }
        state
            .relations
            .get(&(request.root_event_id.clone(), request.from.clone()))
            .cloned()
            .ok_or_else(|| not_scripted("relations"))
    }
}

/// Decrypts every event except the scripted failures
#[derive(Debug, Default)]
pub struct ScriptedDecryptor {
    failing: HashSet<EventId>,
}

impl ScriptedDecryptor {
    pub fn failing(event_ids: &[&str]) -> Self {
        Self {
            failing: event_ids.iter().map(|id| EventId::from(*id)).collect(),
        }
    }
}

impl EventDecryptor for ScriptedDecryptor {
    fn decrypt(&self, _room_id: &RoomId, event: &RawEvent) -> Result<ClearContent, DecryptionError> {
        match &event.event_id {
            Some(event_id) if self.failing.contains(event_id) => Err(
                DecryptionError::UnknownInboundSession("session".to_string()),
            ),
            _ => Ok(ClearContent {
                event_type: "m.room.message".to_string(),
                content: json!({ "msgtype": "m.text", "body": "decrypted" }),
                sender_key: None,
            }),
        }
    }
}

/// Records every callback invocation
#[derive(Debug, Default)]
pub struct RecordingCallback {
    missing_chunks: Mutex<Vec<EventId>>,
    unresolved_roots: Mutex<Vec<EventId>>,
}

impl RecordingCallback {
    pub fn missing_chunks(&self) -> Vec<EventId> {
        self.missing_chunks.lock().unwrap().clone()
    }

    pub fn unresolved_roots(&self) -> Vec<EventId> {
        self.unresolved_roots.lock().unwrap().clone()
    }
}

impl ThreadSyncCallback for RecordingCallback {
    fn on_missing_chunk(&self, _room_id: &RoomId, root_event_id: &EventId) {
        self.missing_chunks
            .lock()
            .unwrap()
            .push(root_event_id.clone());
    }

    fn on_root_unresolved(&self, _room_id: &RoomId, root_event_id: &EventId) {
        self.unresolved_roots
            .lock()
            .unwrap()
            .push(root_event_id.clone());
    }
}
