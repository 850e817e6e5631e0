//! Thread sync errors

use thread_storage_traits::ThreadStorageError;

use crate::api::TransportError;

/// Thread sync error
///
/// Only failures that abort a whole call are reported here. Malformed events
/// are skipped and decryption failures are recorded on the affected event.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport error, propagated unmodified
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Storage error
    #[error(transparent)]
    Storage(#[from] ThreadStorageError),
    /// The server-side filter could not be serialized
    #[error("invalid filter: {0}")]
    Filter(#[from] serde_json::Error),
}
