//! Event storage test functions

use thread_storage_traits::EventId;
use thread_storage_traits::events::EventStorage;
use thread_storage_traits::events::types::{DecryptionError, DecryptionOutcome};

use super::{create_test_record, test_room};

/// One record per identity, whichever path stores it first
pub fn test_event_identity_is_unique<S>(storage: S)
where
    S: EventStorage,
{
    let mut first = create_test_record("$a", "@alice:x", 1);
    first.content = serde_json::json!({ "body": "original" });
    assert!(storage.insert_event(first).unwrap());

    let mut second = create_test_record("$a", "@alice:x", 1);
    second.content = serde_json::json!({ "body": "copy" });
    assert!(!storage.insert_event(second.clone()).unwrap());
    storage.save_timeline_event(second).unwrap();

    assert_eq!(storage.event_count(&test_room()).unwrap(), 1);
    let timeline = storage.room_timeline(&test_room()).unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].content["body"], "original");
}

/// Decryption outcomes are written to the shared record
pub fn test_event_decryption_outcome<S>(storage: S)
where
    S: EventStorage,
{
    storage
        .save_timeline_event(create_test_record("$enc", "@bob:x", 1))
        .unwrap();
    storage
        .set_event_decryption(
            &test_room(),
            &EventId::from("$enc"),
            DecryptionOutcome::Failed(DecryptionError::KeyWithheld("m.unverified".to_string())),
        )
        .unwrap();

    let record = storage
        .find_event(&test_room(), &EventId::from("$enc"))
        .unwrap()
        .unwrap();
    assert!(record.is_undecryptable());
    assert!(
        storage
            .set_event_decryption(
                &test_room(),
                &EventId::from("$missing"),
                DecryptionOutcome::Failed(DecryptionError::Other("x".to_string())),
            )
            .is_err()
    );
}

/// Rooms are isolated from each other
pub fn test_event_rooms_are_isolated<S>(storage: S)
where
    S: EventStorage,
{
    let mut other = create_test_record("$a", "@alice:x", 1);
    other.room_id = "!other:x".into();
    storage.insert_event(other).unwrap();
    storage.insert_event(create_test_record("$a", "@alice:x", 1)).unwrap();

    assert_eq!(storage.event_count(&test_room()).unwrap(), 1);
    assert_eq!(storage.event_count(&"!other:x".into()).unwrap(), 1);
    assert!(storage.room_timeline(&"!other:x".into()).unwrap().is_empty());
}
