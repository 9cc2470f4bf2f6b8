use crate::LeadId;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Failures reported by a store.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A unique key is already present in a collection.
    #[error("duplicate key {key} in {collection}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },

    /// The counter for an id-space has no values left.
    #[error("sequence {name:?} is exhausted")]
    SequenceExhausted { name: String },

    /// A conditional update found a different version than expected.
    #[error("lead {id} changed since it was read")]
    VersionConflict { id: LeadId },

    /// Reading or writing the snapshot file failed.
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file could not be encoded or decoded.
    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}
