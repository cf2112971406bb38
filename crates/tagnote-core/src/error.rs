//! Error types for tagnote.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using tagnote's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tagnote operations.
///
/// Expected failures are returned as `Err` values so callers can branch on
/// the originating variant; panics are reserved for programmer error.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed input caught before any side effect
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record not found
    #[error("Record not found: {0}")]
    RecordNotFound(Uuid),

    /// Another record already carries the exact same tag set
    #[error("Duplicate record: tag set matches existing record {0}")]
    DuplicateRecord(Uuid),

    /// Tag factory rejected a parsed token
    #[error("Cannot create tag: {0}")]
    TagCreation(String),

    /// Transaction protocol violation (begin while active, commit without begin)
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Unexpected failure outside the transaction boundary
    #[error("Use case error: {0}")]
    UseCase(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable discriminant code for callers that branch on failure class
    /// rather than on the concrete variant (export payloads, logs).
    pub fn code(&self) -> &'static str {
        match self {
            Error::Database(_) => "DATABASE_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::RecordNotFound(_) => "RECORD_NOT_FOUND",
            Error::DuplicateRecord(_) => "DUPLICATE_RECORD",
            Error::TagCreation(_) => "TAG_CREATION_ERROR",
            Error::Transaction(_) => "TRANSACTION_ERROR",
            Error::UseCase(_) => "USE_CASE_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the caller can recover by correcting input and retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Config(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
