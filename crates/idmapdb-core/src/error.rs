//! Error types for `idmapdb`.
//!
//! This module provides a unified error type for all index and mapper
//! operations. Error codes follow the pattern `IDMAP-XXX` for easy
//! debugging.

use thiserror::Error;

/// Result type alias for `idmapdb` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `idmapdb` operations.
///
/// Each variant includes a descriptive error message suitable for end-users.
#[derive(Error, Debug)]
pub enum Error {
    /// Vector dimension mismatch (IDMAP-001).
    #[error("[IDMAP-001] Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Batch length mismatch (IDMAP-002).
    #[error("[IDMAP-002] Batch length mismatch: {vectors} vectors paired with {ids} ids")]
    LengthMismatch {
        /// Number of vectors in the batch.
        vectors: usize,
        /// Number of ids in the batch.
        ids: usize,
    },

    /// Mapper key not found (IDMAP-003).
    #[error("[IDMAP-003] Key '{0}' not found in mapper")]
    KeyNotFound(String),

    /// IO error (IDMAP-004).
    #[error("[IDMAP-004] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (IDMAP-005).
    #[error("[IDMAP-005] Serialization error: {0}")]
    Serialization(String),

    /// Engine snapshot corrupted (IDMAP-006).
    ///
    /// Indicates that an index snapshot file cannot be interpreted and the
    /// index needs to be rebuilt from source data.
    #[error("[IDMAP-006] Engine snapshot corrupted: {0}")]
    EngineCorrupted(String),
}

impl Error {
    /// Returns the error code (e.g., "IDMAP-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "IDMAP-001",
            Self::LengthMismatch { .. } => "IDMAP-002",
            Self::KeyNotFound(_) => "IDMAP-003",
            Self::Io(_) => "IDMAP-004",
            Self::Serialization(_) => "IDMAP-005",
            Self::EngineCorrupted(_) => "IDMAP-006",
        }
    }

    /// Returns true if this error is recoverable.
    ///
    /// Corrupted snapshots are not recoverable without rebuilding the index.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::EngineCorrupted(_))
    }
}

/// Conversion from `serde_json` errors surfaced while reading or writing
/// mapper files.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
