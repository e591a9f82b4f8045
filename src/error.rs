//! Error types for cycledb operations.

/// Errors returned by cache operations.
///
/// The four redb variants (`Transaction`, `Table`, `Storage`, `Commit`)
/// surface errors from the underlying store unchanged; the remaining
/// variants are cache-level conditions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No ring tables exist under the configured root namespace.
    #[error("no ring tables under root {0:?}")]
    RootMissing(String),

    /// A table under the root namespace does not have a well-formed ring
    /// name (16 lowercase hex digits).
    #[error("malformed ring table name: {0:?}")]
    UnexpectedChildShape(String),

    /// An operation needed the newest ring but none exists.
    #[error("no newest ring")]
    NoNewestRing,

    /// A key was observed in more than one ring, or ring iteration produced
    /// keys out of order.
    #[error("ring keys duplicated or out of order")]
    OrderingWrong,

    /// Invalid options were supplied to [`crate::CycleCache::open`].
    #[error("configuration: {0}")]
    Configuration(String),

    /// A mutating operation was attempted on a read-only instance.
    #[error("cache is read-only")]
    ReadOnly,

    /// Failed to begin a transaction on the store.
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Failed to open or delete a table.
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    /// A storage-level failure inside a transaction.
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// Failed to commit a write transaction.
    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),
}

impl Error {
    /// Whether this error came from the underlying store rather than from
    /// cache-level validation.
    pub const fn is_store(&self) -> bool {
        matches!(
            self,
            Error::Transaction(_) | Error::Table(_) | Error::Storage(_) | Error::Commit(_)
        )
    }
}

/// A cycledb result.
pub type Result<T> = std::result::Result<T, Error>;
