//! Error types for postgen.

use thiserror::Error;

/// Errors that abort a postgen operation.
#[derive(Error, Debug)]
pub enum PostgenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not fetch sheet: {0}")]
    SheetFetch(String),

    #[error("Sheet format error: {0}")]
    SheetFormat(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for postgen operations.
pub type PostgenResult<T> = Result<T, PostgenError>;

/// Why a single submission was left out of the table.
///
/// Rejections never abort a run; they only shrink the accepted set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("malformed submission: {0}")]
    Malformed(String),

    #[error("event is already over")]
    Stale,

    #[error("invalid link '{0}'")]
    InvalidLink(String),

    #[error("submitter '{0}' could not be verified")]
    UnknownSubmitter(String),
}
