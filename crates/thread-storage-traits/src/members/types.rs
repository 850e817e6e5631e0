//! Types for the members module

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Display-relevant state of a room member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberSnapshot {
    /// The member
    pub user_id: UserId,
    /// Display name in this room
    pub display_name: Option<String>,
    /// Avatar URL in this room
    pub avatar_url: Option<String>,
}

impl MemberSnapshot {
    /// Name to show for this member, falling back to the user id
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.user_id.as_str())
    }
}
