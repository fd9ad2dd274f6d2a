//! # Error Types
//!
//! Errors raised while locating, parsing or decoding volume data.

use std::path::PathBuf;

use isosurface::IsosurfaceError;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while reading a volume.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A descriptor or data file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// A descriptor line is malformed.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// A required descriptor entry is absent.
    #[error("Missing required entry: {0}")]
    MissingField(&'static str),

    /// The descriptor uses a feature this reader does not handle.
    #[error("Unsupported descriptor feature: {0}")]
    Unsupported(String),

    /// The data file is shorter than the grid it describes.
    #[error("Truncated data: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes needed for the first variable at the first time step
        expected: usize,
        /// Bytes available after any file header
        actual: usize,
    },

    /// The decoded volume does not form a valid grid.
    #[error("Invalid volume: {0}")]
    Grid(#[from] IsosurfaceError),
}

impl SourceError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SourceError::Parse {
            line,
            message: message.into(),
        }
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for volume sources.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::parse(3, "bad XDEF");
        assert_eq!(err.to_string(), "Parse error at line 3: bad XDEF");

        let err = SourceError::MissingField("DSET");
        assert!(err.to_string().contains("DSET"));

        let err = SourceError::Io {
            path: PathBuf::from("/nowhere/a.ctl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/nowhere/a.ctl"));
    }

    #[test]
    fn test_grid_error_converts() {
        let err: SourceError = IsosurfaceError::Unclassified.into();
        assert!(matches!(err, SourceError::Grid(_)));
    }
}
