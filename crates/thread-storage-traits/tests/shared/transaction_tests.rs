//! Transaction test functions

use thread_storage_traits::{EventId, ThreadStorageError, ThreadStorageProvider};

use super::{create_test_record, test_room};

/// Every write of a failed transaction is discarded
pub fn test_transaction_is_atomic<S>(storage: S)
where
    S: ThreadStorageProvider,
{
    let root = EventId::from("$root");
    storage.create_thread_chunk(&test_room(), &root).unwrap();

    let result: Result<(), ThreadStorageError> = storage.transaction(|tx| {
        tx.insert_event(create_test_record("$a", "@alice:x", 1))?;
        tx.append_to_chunk(&test_room(), &root, EventId::from("$a"))?;
        tx.set_prev_token(&test_room(), &root, Some("t1".into()))?;
        Err(ThreadStorageError::Database("rollback".to_string()))
    });
    assert!(result.is_err());

    let chunk = storage.find_thread_chunk(&test_room(), &root).unwrap().unwrap();
    assert!(chunk.is_empty());
    assert_eq!(chunk.prev_token, None);
    assert!(
        storage
            .find_event(&test_room(), &EventId::from("$a"))
            .unwrap()
            .is_none()
    );
}

/// Existence checks inside a transaction see committed and pending records
pub fn test_transaction_existence_checks<S>(storage: S)
where
    S: ThreadStorageProvider,
{
    storage
        .save_timeline_event(create_test_record("$main", "@alice:x", 1))
        .unwrap();

    storage
        .transaction(|tx| {
            assert!(!tx.insert_event(create_test_record("$main", "@alice:x", 1))?);
            assert!(tx.insert_event(create_test_record("$new", "@bob:x", 2))?);
            assert!(tx.find_event(&test_room(), &EventId::from("$new"))?.is_some());
            assert!(!tx.insert_event(create_test_record("$new", "@bob:x", 2))?);
            Ok::<_, ThreadStorageError>(())
        })
        .unwrap();

    assert_eq!(storage.event_count(&test_room()).unwrap(), 2);
}

/// Chunk writes require an existing chunk
pub fn test_transaction_requires_chunk<S>(storage: S)
where
    S: ThreadStorageProvider,
{
    let result: Result<(), ThreadStorageError> = storage.transaction(|tx| {
        tx.set_prev_token(&test_room(), &EventId::from("$nope"), None)
    });
    assert!(matches!(result, Err(ThreadStorageError::NotFound(_))));
}
