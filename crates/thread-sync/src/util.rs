//! Helpers shared by discovery and page merging

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use thread_storage_traits::UserId;
use thread_storage_traits::members::types::MemberSnapshot;

/// Current local time in milliseconds since the Unix epoch
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Memoizes membership snapshot lookups within one batch.
///
/// Each unique sender is resolved once, including senders without a
/// snapshot.
#[derive(Debug, Default)]
pub(crate) struct SenderCache {
    resolved: HashMap<UserId, Option<MemberSnapshot>>,
}

impl SenderCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot of `user_id`, calling `resolve` on a miss
    pub(crate) fn get_or_resolve<F, E>(
        &mut self,
        user_id: &UserId,
        resolve: F,
    ) -> Result<Option<MemberSnapshot>, E>
    where
        F: FnOnce(&UserId) -> Result<Option<MemberSnapshot>, E>,
    {
        if let Some(snapshot) = self.resolved.get(user_id) {
            return Ok(snapshot.clone());
        }
        let snapshot = resolve(user_id)?;
        self.resolved.insert(user_id.clone(), snapshot.clone());
        Ok(snapshot)
    }
}
