//! Error types for dice pool trees.

/// Errors raised by die types and pool trees.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// A node, die type, or other named item does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Serialized pool data could not be decoded.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// The operation cannot be performed on this value, e.g. rolling a placeholder die.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The tree would be left in an inconsistent shape.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
