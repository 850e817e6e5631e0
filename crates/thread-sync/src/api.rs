//! Remote API used by thread reconciliation.
//!
//! The transport itself (HTTP client, retries, backoff) lives outside this
//! crate. Implementors of [`ThreadsApi`] surface failures as
//! [`TransportError`], which the engine propagates unmodified.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thread_storage_traits::events::types::{RawEvent, THREAD_RELATION_TYPE};
use thread_storage_traits::{Cursor, EventId, RoomId, UserId};

/// Error reported by the transport layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with an error status
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Matrix error code, e.g. `M_FORBIDDEN`
        errcode: Option<String>,
        /// Human readable message
        message: String,
    },
    /// The request never got an answer
    #[error("network error: {0}")]
    Network(String),
    /// The answer could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
}

/// Pagination direction of a room messages request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards older events
    #[default]
    #[serde(rename = "b")]
    Backward,
    /// Towards newer events
    #[serde(rename = "f")]
    Forward,
}

impl Direction {
    /// Query-string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backward => "b",
            Self::Forward => "f",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side event filter selecting thread roots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEventFilter {
    /// Only return events that have relations of these types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_by_rel_types: Vec<String>,
    /// Only return events that have relations sent by these users
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_by_senders: Vec<UserId>,
}

impl RoomEventFilter {
    /// Filter on thread roots, optionally restricted to threads `participant` replied to
    pub fn thread_roots(participant: Option<&UserId>) -> Self {
        Self {
            related_by_rel_types: vec![THREAD_RELATION_TYPE.to_string()],
            related_by_senders: participant.into_iter().cloned().collect(),
        }
    }

    /// JSON form sent as the `filter` query parameter
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One request to the room messages endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessagesRequest {
    /// Room to read
    pub room_id: RoomId,
    /// Where to start; `None` starts from the most recent event
    pub from: Option<Cursor>,
    /// Pagination direction
    pub direction: Direction,
    /// Maximum number of events to return
    pub limit: u32,
    /// JSON-encoded [`RoomEventFilter`]
    pub filter: Option<String>,
}

/// One request to the relations endpoint of a thread root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationsRequest {
    /// Room of the thread
    pub room_id: RoomId,
    /// The thread root
    pub root_event_id: EventId,
    /// Where to start; `None` starts from the most recent reply
    pub from: Option<Cursor>,
    /// Maximum number of replies to return
    pub limit: u32,
}

/// A page of room messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginatedMessages {
    /// Events, in server order
    #[serde(rename = "chunk", default)]
    pub events: Vec<RawEvent>,
    /// Cursor of the next page; absent when there is none
    #[serde(rename = "end", default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

/// A page of thread replies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginatedRelations {
    /// Replies, in server order
    #[serde(rename = "chunk", default)]
    pub events: Vec<RawEvent>,
    /// The server's view of the root event
    #[serde(rename = "original_event", default, skip_serializing_if = "Option::is_none")]
    pub root_event: Option<RawEvent>,
    /// Cursor to older replies; absent on the oldest page
    #[serde(rename = "next_batch", default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

/// Paginated queries consumed by thread reconciliation
#[async_trait]
pub trait ThreadsApi: Send + Sync {
    /// Fetch one page of room messages
    async fn fetch_room_messages(
        &self,
        request: RoomMessagesRequest,
    ) -> Result<PaginatedMessages, TransportError>;

    /// Fetch one page of replies to a thread root
    async fn fetch_relations(
        &self,
        request: RelationsRequest,
    ) -> Result<PaginatedRelations, TransportError>;
}
