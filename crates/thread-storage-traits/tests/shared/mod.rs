//! Storage conformance tests shared by every backend

pub mod chunk_tests;
pub mod event_tests;
pub mod summary_tests;
pub mod transaction_tests;

use serde_json::json;
use thread_storage_traits::RoomId;
use thread_storage_traits::events::types::{EventRecord, RawEvent, SendState};

pub fn test_room() -> RoomId {
    RoomId::from("!conformance:example.org")
}

/// Builds a synced record of `test_room()`
pub fn create_test_record(event_id: &str, sender: &str, ts: u64) -> EventRecord {
    let raw: RawEvent = serde_json::from_value(json!({
        "event_id": event_id,
        "sender": sender,
        "type": "m.room.message",
        "origin_server_ts": ts,
        "content": { "msgtype": "m.text", "body": event_id }
    }))
    .unwrap();
    EventRecord::from_raw(
        test_room(),
        raw.identity().unwrap(),
        &raw,
        SendState::Synced,
        ts,
    )
}
