//! Error types for the die type catalog and saved pools.

use rtb_core::PoolError;

/// Errors raised while reading or writing the catalog and saved pools.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A die type, pool, or file is not registered.
    #[error("not found: {0}")]
    NotFound(String),

    /// A custom die type tried to take a built-in name.
    #[error("\"{0}\" is the name of a built-in die type")]
    NameReserved(String),

    /// A list or entity file does not have the expected layout.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// The underlying storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request cannot be carried out, e.g. saving a pool with a missing die type.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A tree edit would break the tree's structure.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<PoolError> for StoreError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::NotFound(m) => Self::NotFound(m),
            PoolError::CorruptData(m) => Self::CorruptData(m),
            PoolError::InvalidOperation(m) => Self::InvalidOperation(m),
            PoolError::InvariantViolation(m) => Self::InvariantViolation(m),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::CorruptData(err.to_string())
    }
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
