//! Members module
//!
//! Room membership snapshots used to decorate thread summaries and
//! materialized events with display-relevant sender data.

pub mod types;

use crate::error::ThreadStorageError;
use crate::ids::{RoomId, UserId};

use self::types::MemberSnapshot;

/// Storage traits for the members module
pub trait MemberStorage {
    /// Find the current membership snapshot of a user in a room
    fn find_member_snapshot(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<Option<MemberSnapshot>, ThreadStorageError>;

    /// Save (replace) the membership snapshot of a user in a room
    fn save_member_snapshot(
        &self,
        room_id: &RoomId,
        snapshot: MemberSnapshot,
    ) -> Result<(), ThreadStorageError>;
}
