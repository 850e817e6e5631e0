//! Decryption hook
//!
//! Encrypted events are handed to an [`EventDecryptor`] when they are
//! materialized. The outcome, success or failure, is stored on the record.

use std::fmt::Debug;

use thread_storage_traits::{RoomId, ThreadStorageProvider};
use thread_storage_traits::events::types::{
    ClearContent, DecryptionError, DecryptionOutcome, EventRecord, RawEvent,
};

use crate::ThreadSync;
use crate::api::ThreadsApi;

/// Decrypts `m.room.encrypted` events.
///
/// Calls are synchronous: the network fetch stays the only await point of a
/// page merge.
pub trait EventDecryptor: Send + Sync + Debug {
    /// Decrypt one wire event of `room_id`
    fn decrypt(&self, room_id: &RoomId, event: &RawEvent) -> Result<ClearContent, DecryptionError>;
}

impl<Storage, Api> ThreadSync<Storage, Api>
where
    Storage: ThreadStorageProvider,
    Api: ThreadsApi,
{
    /// Attaches a decryption outcome to `record` if it is encrypted, not yet
    /// decrypted and a decryptor is configured.
    pub(crate) fn decrypt_if_needed(&self, record: &mut EventRecord, raw: &RawEvent) {
        let Some(decryptor) = &self.decryptor else {
            return;
        };
        if !record.is_encrypted() || record.decryption.is_some() {
            return;
        }

        let outcome = DecryptionOutcome::from(decryptor.decrypt(&record.room_id, raw));
        if let DecryptionOutcome::Failed(error) = &outcome {
            tracing::debug!(
                target: "thread_sync::decryption::decrypt_if_needed",
                event_id = %record.event_id,
                %error,
                "Failed to decrypt event"
            );
        }
        record.decryption = Some(outcome);
    }
}
