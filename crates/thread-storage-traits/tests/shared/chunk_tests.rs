//! Chunk storage test functions

use thread_storage_traits::events::EventStorage;
use thread_storage_traits::{EventId, ThreadStorageError, ThreadStorageProvider};

use super::{create_test_record, test_room};

/// Chunks are created once and keep their contents
pub fn test_create_and_find_chunk<S>(storage: S)
where
    S: ThreadStorageProvider,
{
    let root = EventId::from("$root");
    assert!(storage.find_thread_chunk(&test_room(), &root).unwrap().is_none());

    let created = storage.create_thread_chunk(&test_room(), &root).unwrap();
    assert!(created.is_empty());
    assert_eq!(created.root_event_id, root);

    storage
        .transaction(|tx| {
            tx.append_to_chunk(&test_room(), &root, EventId::from("$a"))?;
            tx.set_prev_token(&test_room(), &root, Some("older".into()))
        })
        .unwrap();

    let again = storage.create_thread_chunk(&test_room(), &root).unwrap();
    assert_eq!(again.event_ids(), &[EventId::from("$a")]);
    assert_eq!(again.prev_token, Some("older".into()));
}

/// Chunk events resolve through the event store in chunk order
pub fn test_chunk_events_in_order<S>(storage: S)
where
    S: ThreadStorageProvider,
{
    let root = EventId::from("$root");
    storage.create_thread_chunk(&test_room(), &root).unwrap();
    for (id, ts) in [("$c", 3), ("$a", 1), ("$b", 2)] {
        storage.insert_event(create_test_record(id, "@alice:x", ts)).unwrap();
    }

    storage
        .transaction(|tx| {
            for id in ["$c", "$a", "$b", "$a"] {
                tx.append_to_chunk(&test_room(), &root, EventId::from(id))?;
            }
            Ok::<_, ThreadStorageError>(())
        })
        .unwrap();

    let ids: Vec<EventId> = storage
        .thread_chunk_events(&test_room(), &root)
        .unwrap()
        .into_iter()
        .map(|record| record.event_id)
        .collect();
    assert_eq!(
        ids,
        vec![EventId::from("$c"), EventId::from("$a"), EventId::from("$b")]
    );
}

/// Deleting a chunk leaves the event store alone
pub fn test_delete_chunk<S>(storage: S)
where
    S: ThreadStorageProvider,
{
    let root = EventId::from("$root");
    storage.create_thread_chunk(&test_room(), &root).unwrap();
    storage.insert_event(create_test_record("$a", "@alice:x", 1)).unwrap();

    assert!(storage.delete_thread_chunk(&test_room(), &root).unwrap());
    assert!(!storage.delete_thread_chunk(&test_room(), &root).unwrap());
    assert!(matches!(
        storage.thread_chunk_events(&test_room(), &root),
        Err(ThreadStorageError::NotFound(_))
    ));
    assert_eq!(storage.event_count(&test_room()).unwrap(), 1);
}
