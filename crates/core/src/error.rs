//! Error types for the persistence layer
//!
//! A single error enum covers every failure the engine can surface:
//! store errors are passed through unchanged, hook errors carry whatever the
//! entity author returned, and shape violations are reported as
//! `InvalidArgument` rather than being conflated with store failures.
//!
//! "No more results" is not an error. Iterators signal it with `Ok(None)`.

use crate::key::Key;
use thiserror::Error;

/// Result type alias for persistence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by entity hooks
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for the persistence layer
#[derive(Debug, Error)]
pub enum Error {
    /// No entity is stored under the key
    #[error("Entity not found: {0}")]
    NotFound(Key),

    /// Store backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Optimistic transaction lost a race on the given key
    #[error("Concurrent transaction conflict on {0}")]
    ConcurrentTransaction(Key),

    /// Encoding or decoding an entity failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A `Getter` or `Putter` hook failed
    #[error("Hook failed: {0}")]
    Hook(#[source] HookError),

    /// Caller passed an argument of the wrong shape or length
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Cursor token is malformed or belongs to another query
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Operation not valid in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Wrap an entity hook failure
    pub fn hook(err: impl Into<HookError>) -> Self {
        Error::Hook(err.into())
    }

    /// Shape-contract violation
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Malformed or foreign cursor
    pub fn invalid_cursor(msg: impl Into<String>) -> Self {
        Error::InvalidCursor(msg.into())
    }

    /// Misuse of iterator or transaction state
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Error::InvalidOperation(msg.into())
    }

    /// Stable reason code for this error
    pub fn reason_code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Storage(_) => "storage",
            Error::ConcurrentTransaction(_) => "concurrent_transaction",
            Error::Serialization(_) => "serialization",
            Error::Hook(_) => "hook_failed",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::InvalidCursor(_) => "invalid_cursor",
            Error::InvalidOperation(_) => "invalid_operation",
        }
    }

    /// Whether the caller (rather than the store or an entity hook) caused this error
    ///
    /// Request handlers map these to 4xx responses and everything else to 5xx.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::InvalidArgument(_) | Error::InvalidCursor(_)
        )
    }

    /// Whether this is the store's not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
