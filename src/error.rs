//! Error types shared across the store.

use std::io;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by store operations.
///
/// Write failures abort the enclosing transaction before surfacing; read
/// operations report `NotFound`/`InvalidArgument` directly.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id was never interned.
    #[error("node {0} not found")]
    NotFound(i64),
    /// A qname used a prefix with no registered binding.
    #[error("unknown namespace prefix '{0}'")]
    UnknownPrefix(String),
    /// A qname had no prefix delimiter.
    #[error("malformed qname '{0}'")]
    MalformedQName(String),
    /// Fetching a source document failed or timed out.
    #[error("fetch failed for {uri}: {reason}")]
    Fetch {
        /// URI of the document being fetched.
        uri: String,
        /// Transport-level failure description.
        reason: String,
    },
    /// A source document could not be parsed.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line within the document.
        line: usize,
        /// What the parser rejected.
        reason: String,
    },
    /// Label resolution revisited a node.
    #[error("cyclic label chain through node {0}")]
    CyclicLabel(i64),
    /// A caller passed an argument outside the operation's domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Underlying persistence failure.
    #[error("store I/O error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Filesystem-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
