//! Identifier newtypes shared by every store
//!
//! Room, event and user identifiers are opaque strings issued by the homeserver.
//! [`Cursor`] is an opaque pagination token; "no further page" is expressed as
//! `Option::<Cursor>::None`, never as an empty token.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier
            pub fn new<S>(value: S) -> Self
            where
                S: Into<String>,
            {
                Self(value.into())
            }

            /// Get as `&str`
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Room identifier (e.g. `!abc:example.org`)
    RoomId
);
string_id!(
    /// Event identifier (e.g. `$abc`)
    EventId
);
string_id!(
    /// User identifier (e.g. `@alice:example.org`)
    UserId
);
string_id!(
    /// Opaque pagination token
    Cursor
);

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_display_and_as_str() {
        let room = RoomId::new("!room:example.org");
        assert_eq!(room.as_str(), "!room:example.org");
        assert_eq!(room.to_string(), "!room:example.org");
    }

    #[test]
    fn test_ids_serialize_transparent() {
        let event_id = EventId::from("$event");
        let serialized = serde_json::to_string(&event_id).unwrap();
        assert_eq!(serialized, r#""$event""#);

        let cursor: Cursor = serde_json::from_str(r#""t47-1234""#).unwrap();
        assert_eq!(cursor, Cursor::new("t47-1234"));
    }

    #[test]
    fn test_ids_hash_by_value() {
        let mut set = HashSet::new();
        set.insert(UserId::from("@alice:example.org"));
        set.insert(UserId::from(String::from("@alice:example.org")));
        assert_eq!(set.len(), 1);
    }
}
