//! Error types for store operations.

use std::path::PathBuf;

/// Errors that can occur while reading or writing persisted build state.
///
/// Reads are fail-safe at the call sites that matter: an unreadable manifest
/// or artifact is treated as absent, which degrades to a full rebuild rather
/// than a hard failure. Writes surface these errors directly.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing build state.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A value could not be serialized for persistence.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
