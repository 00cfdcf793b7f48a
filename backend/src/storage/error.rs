use thiserror::Error;

/// Result alias used across the storage layer
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure taxonomy of the storage layer.
///
/// Connectivity problems are fatal at open time; everything else is a
/// per-operation failure that leaves storage as it was before the attempted
/// write (per statement in the relational backend, per file in the file
/// backend).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be opened (bad path, unreachable database)
    #[error("storage connection failed: {0}")]
    Connection(String),

    /// A single relational operation failed (constraint violation, ...)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A single file operation failed
    #[error("file storage error: {0}")]
    Io(#[from] std::io::Error),

    /// An entity snapshot could not be encoded or decoded
    #[error("entity snapshot error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A stored timestamp did not parse back
    #[error("stored timestamp could not be parsed: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// Lookup of an entity that does not exist in storage
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    /// Save of an entity whose owner does not exist
    #[error("{kind} references missing {referenced_kind} {referenced_id}")]
    MissingReference {
        kind: &'static str,
        referenced_kind: &'static str,
        referenced_id: i64,
    },

    /// A file-backend cascade completed only partially.
    ///
    /// Deletes are idempotent, so rerunning the same delete retries exactly
    /// the entities that are still on disk.
    #[error("cascade delete incomplete: {deleted} removed, {failed} left behind")]
    PartialCascade { deleted: usize, failed: usize },
}
