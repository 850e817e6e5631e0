//! Thread summaries module
//!
//! One [`ThreadSummary`](types::ThreadSummary) per thread root, written by thread
//! discovery (full replace) and by live sync (incremental add). Used by
//! room-level thread lists.

pub mod types;

use crate::error::ThreadStorageError;
use crate::ids::{EventId, RoomId};

use self::types::ThreadSummary;

/// Storage traits for the thread summaries module
pub trait ThreadSummaryStorage {
    /// Save a summary, overwriting any previous summary of the same thread
    fn save_thread_summary(&self, summary: ThreadSummary) -> Result<(), ThreadStorageError>;

    /// Find the summary of a thread
    fn find_thread_summary(
        &self,
        room_id: &RoomId,
        root_event_id: &EventId,
    ) -> Result<Option<ThreadSummary>, ThreadStorageError>;

    /// All summaries of a room, most recently active thread first
    fn thread_summaries(&self, room_id: &RoomId) -> Result<Vec<ThreadSummary>, ThreadStorageError>;
}
