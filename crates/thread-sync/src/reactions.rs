//! Reaction aggregation
//!
//! Folds the inline `m.annotation` chunk of a newly materialized event into
//! per-key [`ReactionAggregate`]s. Counts only grow here; redactions are
//! handled elsewhere.

use std::collections::BTreeSet;

use thread_storage_traits::events::types::RawEvent;
use thread_storage_traits::reactions::types::ReactionAggregate;
use thread_storage_traits::{RoomId, StorageTransaction, ThreadStorageError};

/// Applies the inline reaction annotations of `event` to its aggregates.
///
/// A key seen for the first time starts at a count of 1 with the event's
/// server timestamp as first-seen time. A known key is incremented by 1.
/// Returns the keys touched, which callers record on the event.
pub fn apply_inline_annotations(
    tx: &mut dyn StorageTransaction,
    room_id: &RoomId,
    event: &RawEvent,
) -> Result<BTreeSet<String>, ThreadStorageError> {
    let mut keys = BTreeSet::new();
    let Some(target_event_id) = &event.event_id else {
        return Ok(keys);
    };
    let timestamp = event.origin_server_ts.unwrap_or_default();

    for annotation in event.reaction_annotations() {
        let aggregate = match tx.find_reaction(room_id, target_event_id, &annotation.key)? {
            Some(mut existing) => {
                existing.count = existing.count.saturating_add(1);
                existing
            }
            None => ReactionAggregate::first_seen(
                room_id.clone(),
                target_event_id.clone(),
                annotation.key.clone(),
                timestamp,
            ),
        };

        tracing::trace!(
            target: "thread_sync::reactions::apply_inline_annotations",
            event_id = %target_event_id,
            key = %aggregate.key,
            count = aggregate.count,
            "Updated reaction aggregate"
        );

        tx.save_reaction(aggregate)?;
        keys.insert(annotation.key.clone());
    }

    Ok(keys)
}
