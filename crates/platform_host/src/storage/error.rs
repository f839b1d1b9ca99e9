//! Storage failure taxonomy.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors raised by [`crate::KeyValueStore`] implementations and typed helpers.
pub enum StorageError {
    /// A stored value exists but could not be decoded.
    #[error("stored value for `{key}` is corrupt: {reason}")]
    CorruptValue {
        /// Storage key holding the bad value.
        key: String,
        /// Decoder message.
        reason: String,
    },
    /// The backend refused the write (quota exceeded, private mode, ...).
    #[error("write to `{key}` failed: {reason}")]
    QuotaOrWriteFailure {
        /// Storage key being written.
        key: String,
        /// Backend message.
        reason: String,
    },
    /// No storage backend is reachable in this environment.
    #[error("storage backend unavailable")]
    Unavailable,
}
