//! Setup-layer errors.
//!
//! Only database setup reports errors; the matching engine itself degrades
//! every per-candidate failure to [`MatchOutcome::NotFound`](crate::MatchOutcome)
//! so the trust decision fails closed instead of aborting.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading database sources.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source path does not exist. Callers loading optional system
    /// databases treat this as a soft skip.
    #[error("database source not found: {path}")]
    NotFound { path: PathBuf },

    /// Reading the source failed for a reason other than absence.
    #[error("failed to read database source {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A firmware-variable source is too short to carry the 4-byte
    /// attribute prefix.
    #[error("firmware variable {path} is too short ({len} bytes)")]
    TruncatedVariable { path: PathBuf, len: usize },
}

impl LoadError {
    /// True for sources that are merely absent, as opposed to unreadable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}
