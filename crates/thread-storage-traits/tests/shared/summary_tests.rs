//! Thread summary and reaction storage test functions

use thread_storage_traits::reactions::types::ReactionAggregate;
use thread_storage_traits::summaries::types::{ThreadSummary, ThreadSummaryUpdateKind};
use thread_storage_traits::{EventId, ThreadStorageError, ThreadStorageProvider};

use super::{create_test_record, test_room};

fn create_test_summary(root: &str, ts: u64) -> ThreadSummary {
    ThreadSummary {
        room_id: test_room(),
        root_event_id: EventId::from(root),
        root_event: create_test_record(root, "@alice:x", ts),
        root_sender: None,
        latest_event: None,
        latest_sender: None,
        reply_count: None,
        is_user_participating: false,
        update_kind: ThreadSummaryUpdateKind::Replace,
    }
}

/// Summaries are overwritten and listed most recent first
pub fn test_save_and_list_summaries<S>(storage: S)
where
    S: ThreadStorageProvider,
{
    storage.save_thread_summary(create_test_summary("$old", 1)).unwrap();
    storage.save_thread_summary(create_test_summary("$new", 9)).unwrap();

    let mut replaced = create_test_summary("$old", 1);
    replaced.reply_count = Some(2);
    replaced.update_kind = ThreadSummaryUpdateKind::Add;
    storage
        .transaction(|tx| tx.save_thread_summary(replaced.clone()))
        .unwrap();

    let summaries = storage.thread_summaries(&test_room()).unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].root_event_id, EventId::from("$new"));
    assert_eq!(summaries[1], replaced);
}

/// Reaction aggregates are saved through transactions
pub fn test_reaction_aggregates<S>(storage: S)
where
    S: ThreadStorageProvider,
{
    let target = EventId::from("$target");
    storage
        .transaction(|tx| {
            tx.save_reaction(ReactionAggregate::first_seen(
                test_room(),
                target.clone(),
                "👍".to_string(),
                5,
            ))?;
            let mut existing = tx
                .find_reaction(&test_room(), &target, "👍")?
                .ok_or_else(|| ThreadStorageError::NotFound("👍".to_string()))?;
            existing.count += 1;
            tx.save_reaction(existing)
        })
        .unwrap();

    let all = storage.reactions_for_event(&test_room(), &target).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].count, 2);
    assert_eq!(all[0].first_timestamp, 5);
}
