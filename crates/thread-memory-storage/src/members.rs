//! Memory-based storage implementation of the MemberStorage trait

use thread_storage_traits::members::MemberStorage;
use thread_storage_traits::members::types::MemberSnapshot;
use thread_storage_traits::{RoomId, ThreadStorageError, UserId};

use crate::ThreadMemoryStorage;

impl MemberStorage for ThreadMemoryStorage {
    fn find_member_snapshot(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<Option<MemberSnapshot>, ThreadStorageError> {
        // `peek` keeps the read lock shared; recency is only bumped on save.
        let inner = self.inner.read();
        Ok(inner
            .members
            .peek(&(room_id.clone(), user_id.clone()))
            .cloned())
    }

    fn save_member_snapshot(
        &self,
        room_id: &RoomId,
        snapshot: MemberSnapshot,
    ) -> Result<(), ThreadStorageError> {
        let mut inner = self.inner.write();
        inner
            .members
            .put((room_id.clone(), snapshot.user_id.clone()), snapshot);
        Ok(())
    }
}
