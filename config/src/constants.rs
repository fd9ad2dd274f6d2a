//! # Configuration Constants
//!
//! Centralized constants for the isosurface pipeline.
//!
//! ## Categories
//!
//! - **Cube topology**: Corner, edge and case counts of a marching cube
//! - **Mesh layout**: Byte sizes fixed by the binary STL format
//! - **Extraction**: Parallelism thresholds and tolerances
//! - **Runtime**: The validated `GlobalConfig` snapshot

use std::fmt;

// =============================================================================
// CUBE TOPOLOGY CONSTANTS
// =============================================================================

/// Number of corner samples of one cube.
pub const CORNER_COUNT: usize = 8;

/// Number of edges of one cube.
pub const EDGE_COUNT: usize = 12;

/// Number of distinct corner codes (one bit per corner).
///
/// # Example
///
/// ```rust
/// use config::constants::{CASE_COUNT, CORNER_COUNT};
///
/// assert_eq!(CASE_COUNT, 1 << CORNER_COUNT);
/// ```
pub const CASE_COUNT: usize = 256;

/// Maximum number of triangles any single cube configuration emits.
pub const MAX_TRIANGLES_PER_CUBE: usize = 5;

/// Row width of the triangle table: 5 triples plus a `-1` terminator.
pub const TRI_TABLE_ROW_LEN: usize = 16;

// =============================================================================
// MESH LAYOUT CONSTANTS
// =============================================================================

/// Size of the free-form header at the start of a binary STL file.
pub const STL_HEADER_LEN: usize = 80;

/// Size of one binary STL triangle record.
///
/// Normal (3 x f32) + 3 vertices (9 x f32) + u16 attribute byte count.
///
/// # Example
///
/// ```rust
/// use config::constants::STL_TRIANGLE_RECORD_LEN;
///
/// assert_eq!(STL_TRIANGLE_RECORD_LEN, 12 * 4 + 2);
/// ```
pub const STL_TRIANGLE_RECORD_LEN: usize = 50;

// =============================================================================
// EXTRACTION CONSTANTS
// =============================================================================

/// Default cube count below which parallel extraction falls back to the
/// sequential path. Small grids finish faster than rayon can split them.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_MIN_PARALLEL_CUBES;
///
/// let cubes = 31 * 31 * 31;
/// assert!(cubes < DEFAULT_MIN_PARALLEL_CUBES);
/// ```
pub const DEFAULT_MIN_PARALLEL_CUBES: usize = 32_768;

/// Absolute tolerance used when comparing mesh coordinates.
pub const EPSILON: f32 = 1e-6;

// =============================================================================
// RUNTIME CONFIGURATION
// =============================================================================

/// Immutable snapshot of global configuration settings that can be shared
/// between crates.
///
/// # Examples
/// ```
/// use config::constants::GlobalConfig;
/// let config = GlobalConfig::default();
/// assert!(config.min_parallel_cubes > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Whether classification and extraction may run on the rayon pool.
    pub parallel: bool,
    /// Minimum cube count before the parallel path is taken.
    pub min_parallel_cubes: usize,
}

impl GlobalConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// threshold.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GlobalConfig;
    /// let cfg = GlobalConfig::new(true, 1024).expect("valid config");
    /// assert_eq!(cfg.min_parallel_cubes, 1024);
    /// ```
    pub fn new(parallel: bool, min_parallel_cubes: usize) -> Result<Self, ConfigError> {
        if min_parallel_cubes == 0 {
            return Err(ConfigError::InvalidParallelThreshold(min_parallel_cubes));
        }
        Ok(Self {
            parallel,
            min_parallel_cubes,
        })
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            min_parallel_cubes: DEFAULT_MIN_PARALLEL_CUBES,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Raised when the parallel threshold is zero.
    InvalidParallelThreshold(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParallelThreshold(value) => {
                write!(f, "min_parallel_cubes must be > 0: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if two f32 values are approximately equal within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-7));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}
