//! # Error Types
//!
//! Error types for grid construction and extraction.
//!
//! ## Error Policy
//!
//! - Malformed grids are rejected at construction time
//! - Degenerate but valid grids (a size of 1 on any axis) are not errors,
//!   they simply contain no cubes
//! - Non-finite sample values are passed through untouched

use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building a grid or extracting a surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IsosurfaceError {
    /// A grid dimension is zero or the sample count overflows.
    #[error("Invalid grid dimensions: {size_x}x{size_y}x{size_z}")]
    InvalidDimensions {
        /// Sample count along x
        size_x: usize,
        /// Sample count along y
        size_y: usize,
        /// Sample count along z
        size_z: usize,
    },

    /// The scalar array does not hold one value per grid sample.
    #[error("Sample count mismatch: expected {expected}, got {actual}")]
    SampleCountMismatch {
        /// Product of the grid dimensions
        expected: usize,
        /// Length of the supplied value array
        actual: usize,
    },

    /// A grid step is zero or not finite.
    #[error("Invalid grid spacing along {axis}: {step}")]
    InvalidSpacing {
        /// Axis name ("x", "y" or "z")
        axis: &'static str,
        /// Offending step value
        step: f32,
    },

    /// Extraction was requested before any classification pass.
    #[error("Grid has not been classified against an isovalue")]
    Unclassified,

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for isosurface operations.
pub type IsosurfaceResult<T> = Result<T, IsosurfaceError>;

// =============================================================================
// TESTS
// =============================================================================
