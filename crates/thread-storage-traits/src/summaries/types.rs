//! Types for the thread summaries module

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::types::EventRecord;
use crate::ids::{EventId, RoomId};
use crate::members::types::MemberSnapshot;

/// How a summary was last written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadSummaryUpdateKind {
    /// Full overwrite from server data, no partial merge
    Replace,
    /// Incremental update from a live reply
    Add,
}

impl fmt::Display for ThreadSummaryUpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Add => write!(f, "add"),
        }
    }
}

/// Room-level view of one thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSummary {
    /// The room of the thread
    pub room_id: RoomId,
    /// The thread root
    pub root_event_id: EventId,
    /// Snapshot of the root event
    pub root_event: EventRecord,
    /// Membership snapshot of the root sender
    pub root_sender: Option<MemberSnapshot>,
    /// Snapshot of the latest reply, if known
    pub latest_event: Option<EventRecord>,
    /// Membership snapshot of the latest reply sender
    pub latest_sender: Option<MemberSnapshot>,
    /// Number of replies as reported by the server or counted locally
    pub reply_count: Option<u32>,
    /// Whether the local user has taken part in the thread
    pub is_user_participating: bool,
    /// How this summary was last written
    pub update_kind: ThreadSummaryUpdateKind,
}

impl ThreadSummary {
    /// Timestamp used to order thread lists: the latest reply, else the root
    pub fn activity_ts(&self) -> u64 {
        self.latest_event
            .as_ref()
            .and_then(|event| event.origin_server_ts)
            .or(self.root_event.origin_server_ts)
            .unwrap_or_default()
    }

    /// Compares two summaries for thread-list ordering (most recent activity
    /// first, then root id for determinism).
    ///
    /// Returns [`Ordering::Less`] if `self` should appear **before** `other`.
    pub fn list_order_cmp(&self, other: &Self) -> Ordering {
        other
            .activity_ts()
            .cmp(&self.activity_ts())
            .then_with(|| self.root_event_id.cmp(&other.root_event_id))
    }
}
