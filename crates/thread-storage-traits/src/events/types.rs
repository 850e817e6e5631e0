//! Types for the events module

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ids::{EventId, RoomId, UserId};
use crate::members::types::MemberSnapshot;

/// Event type of an end-to-end encrypted event
pub const ENCRYPTED_EVENT_TYPE: &str = "m.room.encrypted";

/// Event type of a reaction
pub const REACTION_EVENT_TYPE: &str = "m.reaction";

/// Relation type of a thread reply
pub const THREAD_RELATION_TYPE: &str = "m.thread";

/// An event exactly as it was received from the server.
///
/// Nothing is trusted: identity fields may be missing on malformed server data,
/// see [`RawEvent::identity`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The event id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// The sender of the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserId>,
    /// The event type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// The event content
    #[serde(default)]
    pub content: Value,
    /// Server timestamp in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_server_ts: Option<u64>,
    /// The room the event belongs to. Events returned by pagination often omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    /// Server-side metadata that is not covered by the signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<UnsignedData>,
}

/// Unsigned event metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnsignedData {
    /// Milliseconds elapsed since the event was sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    /// Server-side aggregations of related events
    #[serde(
        rename = "m.relations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub relations: Option<AggregatedRelations>,
}

/// Aggregated relations attached to an event by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRelations {
    /// Inline annotations (reactions)
    #[serde(
        rename = "m.annotation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub annotations: Option<AggregatedAnnotation>,
    /// Thread summary when this event is a thread root
    #[serde(rename = "m.thread", default, skip_serializing_if = "Option::is_none")]
    pub latest_thread: Option<LatestThreadRelation>,
}

/// Inline annotation aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedAnnotation {
    /// One entry per `(type, key)`
    #[serde(default)]
    pub chunk: Vec<AnnotationChunk>,
}

/// One annotation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationChunk {
    /// Annotation event type, `m.reaction` for reactions
    #[serde(rename = "type")]
    pub annotation_type: String,
    /// The reaction key
    pub key: String,
    /// Number of annotations with this key as counted by the server
    #[serde(default)]
    pub count: u32,
}

impl AnnotationChunk {
    /// Whether this annotation is a reaction
    pub fn is_reaction(&self) -> bool {
        self.annotation_type == REACTION_EVENT_TYPE
    }
}

/// Thread data the server attaches to a thread root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestThreadRelation {
    /// The most recent reply in the thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_event: Option<Box<RawEvent>>,
    /// Number of replies in the thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Whether the requesting user has replied in the thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_participated: Option<bool>,
}

/// The validated identity triple of a [`RawEvent`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventIdentity {
    /// The event id
    pub event_id: EventId,
    /// The sender
    pub sender: UserId,
    /// The event type
    pub event_type: String,
}

impl RawEvent {
    /// Returns the identity triple, or `None` when the event lacks an id, a
    /// sender or a type. Events without an identity are never stored.
    pub fn identity(&self) -> Option<EventIdentity> {
        Some(EventIdentity {
            event_id: self.event_id.clone()?,
            sender: self.sender.clone()?,
            event_type: self.event_type.clone()?,
        })
    }

    /// Whether this event is end-to-end encrypted
    pub fn is_encrypted(&self) -> bool {
        self.event_type.as_deref() == Some(ENCRYPTED_EVENT_TYPE)
    }

    /// Inline reaction annotations carried in the unsigned data
    pub fn reaction_annotations(&self) -> impl Iterator<Item = &AnnotationChunk> {
        self.relations()
            .and_then(|relations| relations.annotations.as_ref())
            .into_iter()
            .flat_map(|annotation| annotation.chunk.iter())
            .filter(|chunk| chunk.is_reaction())
    }

    /// Thread data when this event is a thread root
    pub fn latest_thread(&self) -> Option<&LatestThreadRelation> {
        self.relations()
            .and_then(|relations| relations.latest_thread.as_ref())
    }

    /// The thread root this event replies to, read from `m.relates_to`
    pub fn thread_root_id(&self) -> Option<EventId> {
        let relates_to = self.content.get("m.relates_to")?;
        if relates_to.get("rel_type")?.as_str()? != THREAD_RELATION_TYPE {
            return None;
        }
        relates_to
            .get("event_id")?
            .as_str()
            .map(EventId::from)
    }

    fn relations(&self) -> Option<&AggregatedRelations> {
        self.unsigned.as_ref()?.relations.as_ref()
    }
}

/// The send/sync state of a stored event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendState {
    /// Local echo not yet sent
    Unsent,
    /// Sent, waiting for the server to echo it back
    Sent,
    /// Received from the server through sync or pagination
    Synced,
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unsent => "unsent",
            Self::Sent => "sent",
            Self::Synced => "synced",
        };
        f.write_str(s)
    }
}

/// Cleartext produced by a successful decryption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearContent {
    /// The decrypted event type
    pub event_type: String,
    /// The decrypted content
    pub content: Value,
    /// Curve25519 key of the sending device, if known
    pub sender_key: Option<String>,
}

/// A typed decryption failure attached to an [`EventRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DecryptionError {
    /// The megolm session is unknown to this device
    #[error("unknown inbound session: {0}")]
    UnknownInboundSession(String),
    /// The room key for this message was withheld by the sender
    #[error("room key withheld: {0}")]
    KeyWithheld(String),
    /// The ciphertext could not be parsed
    #[error("malformed encrypted payload: {0}")]
    MalformedPayload(String),
    /// Any other failure
    #[error("unable to decrypt: {0}")]
    Other(String),
}

/// Result of running the decryption hook on an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecryptionOutcome {
    /// Decryption succeeded
    Decrypted(ClearContent),
    /// Decryption failed, readers see the event as undecryptable
    Failed(DecryptionError),
}

impl From<Result<ClearContent, DecryptionError>> for DecryptionOutcome {
    fn from(result: Result<ClearContent, DecryptionError>) -> Self {
        match result {
            Ok(clear) => Self::Decrypted(clear),
            Err(e) => Self::Failed(e),
        }
    }
}

/// The single stored record of an event.
///
/// At most one record exists per `(room_id, event_id)`. The main timeline and
/// every thread chunk reference it by identifier; nothing holds a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// The room of the event
    pub room_id: RoomId,
    /// The event id
    pub event_id: EventId,
    /// The sender
    pub sender: UserId,
    /// The event type as received (`m.room.encrypted` for encrypted events)
    pub event_type: String,
    /// The raw content as received
    pub content: Value,
    /// Server timestamp in milliseconds
    pub origin_server_ts: Option<u64>,
    /// Local timestamp derived from `unsigned.age`
    pub age_local_ts: Option<u64>,
    /// Thread root this event replies to
    pub root_thread_event_id: Option<EventId>,
    /// Send/sync state
    pub send_state: SendState,
    /// Sender membership snapshot resolved when the record was materialized
    pub sender_profile: Option<MemberSnapshot>,
    /// Result of the decryption hook, `None` when never attempted
    pub decryption: Option<DecryptionOutcome>,
    /// Keys of the reaction aggregates targeting this event
    pub reaction_keys: BTreeSet<String>,
}

impl EventRecord {
    /// Builds a record for a validated wire event.
    ///
    /// `now_ms` is the local clock used to turn `unsigned.age` into an absolute
    /// local timestamp.
    pub fn from_raw(
        room_id: RoomId,
        identity: EventIdentity,
        raw: &RawEvent,
        send_state: SendState,
        now_ms: u64,
    ) -> Self {
        let age_local_ts = raw
            .unsigned
            .as_ref()
            .and_then(|unsigned| unsigned.age)
            .map(|age| now_ms.saturating_sub(age.max(0) as u64));

        Self {
            room_id,
            event_id: identity.event_id,
            sender: identity.sender,
            event_type: identity.event_type,
            content: raw.content.clone(),
            origin_server_ts: raw.origin_server_ts,
            age_local_ts,
            root_thread_event_id: raw.thread_root_id(),
            send_state,
            sender_profile: None,
            decryption: None,
            reaction_keys: BTreeSet::new(),
        }
    }

    /// Whether the record is end-to-end encrypted
    pub fn is_encrypted(&self) -> bool {
        self.event_type == ENCRYPTED_EVENT_TYPE
    }

    /// Whether decryption was attempted and failed
    pub fn is_undecryptable(&self) -> bool {
        matches!(self.decryption, Some(DecryptionOutcome::Failed(_)))
    }

    /// The event type readers should display: the cleartext type once decrypted
    pub fn effective_type(&self) -> &str {
        match &self.decryption {
            Some(DecryptionOutcome::Decrypted(clear)) => &clear.event_type,
            _ => &self.event_type,
        }
    }
}
