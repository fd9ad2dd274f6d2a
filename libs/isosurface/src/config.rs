//! Engine-level configuration built on the shared `config` crate.

use config::constants::GlobalConfig;

use crate::error::{IsosurfaceError, IsosurfaceResult};

/// Extraction configuration wrapper.
///
/// # Examples
/// ```
/// use isosurface::ExtractionConfig;
/// let cfg = ExtractionConfig::parallel();
/// assert!(cfg.parallel);
/// assert!(!cfg.should_parallelize(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Run classification and extraction on the rayon pool.
    pub parallel: bool,
    /// Cube count below which the sequential path is used anyway.
    pub min_parallel_cubes: usize,
}

impl ExtractionConfig {
    /// Creates a validated configuration.
    ///
    /// # Examples
    /// ```
    /// use isosurface::ExtractionConfig;
    /// assert!(ExtractionConfig::new(true, 0).is_err());
    /// assert_eq!(ExtractionConfig::new(true, 8).unwrap().min_parallel_cubes, 8);
    /// ```
    pub fn new(parallel: bool, min_parallel_cubes: usize) -> IsosurfaceResult<Self> {
        GlobalConfig::new(parallel, min_parallel_cubes)
            .map(Self::from)
            .map_err(|e| IsosurfaceError::Config(e.to_string()))
    }

    /// Always sequential.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Parallel above the default cube threshold.
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
    }

    /// Whether a grid with `cube_count` cubes should take the parallel path.
    pub fn should_parallelize(&self, cube_count: usize) -> bool {
        self.parallel && cube_count >= self.min_parallel_cubes
    }
}

impl From<GlobalConfig> for ExtractionConfig {
    fn from(cfg: GlobalConfig) -> Self {
        Self {
            parallel: cfg.parallel,
            min_parallel_cubes: cfg.min_parallel_cubes,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        GlobalConfig::default().into()
    }
}
