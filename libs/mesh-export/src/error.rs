//! # Error Types
//!
//! Errors raised while writing or reading mesh files.

use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during mesh export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Underlying writer or file failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A binary STL buffer ended before the data its header promises.
    #[error("Truncated STL data: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required by the header
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Binary STL stores the triangle count as a `u32`.
    #[error("Too many triangles for binary STL: {0}")]
    TooManyTriangles(usize),

    /// Format name not recognised.
    #[error("Unknown mesh format: {0} (expected \"stl\" or \"obj\")")]
    UnknownFormat(String),
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExportError::Truncated {
            expected: 134,
            actual: 100,
        };
        assert!(err.to_string().contains("expected 134"));
        assert!(err.to_string().contains("got 100"));

        let err = ExportError::UnknownFormat("ply".to_string());
        assert!(err.to_string().contains("ply"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExportError = io.into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
