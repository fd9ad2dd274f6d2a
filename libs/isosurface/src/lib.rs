//! Marching Cubes isosurface extraction.
//!
//! Builds a [`VolumeGrid`] from x-fastest scalar samples, classifies it
//! against an isovalue and emits a triangle soup approximating the surface
//! where the field crosses that value.
//!
//! ```
//! use isosurface::{extract_isosurface, ExtractionConfig, GridDims, Vec3, VolumeGrid};
//!
//! let values = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
//! let mut grid = VolumeGrid::new(GridDims::new(2, 2, 2), Vec3::ONE, Vec3::ZERO, values).unwrap();
//! let triangles = extract_isosurface(&mut grid, 0.5, &ExtractionConfig::default());
//! assert_eq!(triangles.len(), 2);
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod geometry;
pub mod grid;
pub mod tables;

pub use self::classifier::ThresholdClassifier;
pub use self::config::ExtractionConfig;
pub use self::error::{IsosurfaceError, IsosurfaceResult};
pub use self::extractor::{extract_isosurface, ExtractionStats, IsosurfaceExtractor};
pub use self::geometry::{Triangle, Vec3};
pub use self::grid::{GridDims, Sample, VolumeGrid};
