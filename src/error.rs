//! Error types for query expansion.
//!
//! All failures are represented by the [`ExpansionError`] enum. A failure to
//! read the index is always fatal for the current expansion: there is no
//! partial-result fallback.
//!
//! An empty feedback set is *not* an error. It is reported through
//! [`Expansion`](crate::feedback::Expansion) and by
//! [`QueryExpansion::expand_query`](crate::feedback::QueryExpansion::expand_query)
//! returning `Ok(false)`.
//!
//! # Examples
//!
//! ```
//! use prf_expansion::error::{ExpansionError, Result};
//!
//! fn read_postings() -> Result<()> {
//!     Err(ExpansionError::index_access("direct index unavailable"))
//! }
//!
//! assert!(read_postings().unwrap_err().is_index_access());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for expansion operations.
#[derive(Error, Debug)]
pub enum ExpansionError {
    /// Failure reading postings or lexicon entries.
    #[error("Index access error: {0}")]
    IndexAccess(String),

    /// Configuration rejected at the loading boundary.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (configuration files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors surfaced by host index adapters.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with ExpansionError.
pub type Result<T> = std::result::Result<T, ExpansionError>;

impl ExpansionError {
    /// Create a new index access error.
    pub fn index_access<S: Into<String>>(msg: S) -> Self {
        ExpansionError::IndexAccess(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ExpansionError::Config(msg.into())
    }

    /// Whether this error came from reading the index.
    ///
    /// Errors raised by host adapters through `anyhow` count as index access
    /// failures, since the index is the only collaborator that produces them.
    pub fn is_index_access(&self) -> bool {
        matches!(
            self,
            ExpansionError::IndexAccess(_) | ExpansionError::Anyhow(_)
        )
    }
}
