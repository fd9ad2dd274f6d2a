//! Threshold classification.
//!
//! A sample is inside the surface when `value > isovalue`. The flags are
//! written in place; one pass serves every extraction at that isovalue.

use rayon::prelude::*;

use crate::grid::VolumeGrid;

/// Writes the inside/outside flags of a grid for one isovalue.
///
/// # Examples
/// ```
/// use isosurface::{GridDims, ThresholdClassifier, Vec3, VolumeGrid};
///
/// let mut grid = VolumeGrid::new(
///     GridDims::new(2, 1, 1),
///     Vec3::ONE,
///     Vec3::ZERO,
///     vec![0.0, 1.0],
/// ).unwrap();
/// ThresholdClassifier::classify(&mut grid, 0.5);
/// assert_eq!(ThresholdClassifier::inside_count(&grid), 1);
/// ```
pub struct ThresholdClassifier;

impl ThresholdClassifier {
    /// Classifies every sample sequentially.
    pub fn classify(grid: &mut VolumeGrid, isovalue: f32) {
        for sample in grid.samples_mut() {
            sample.inside = sample.value > isovalue;
        }
        grid.set_isovalue(isovalue);
    }

    /// Classifies samples on the rayon pool. The pass is complete when this
    /// returns.
    pub fn classify_parallel(grid: &mut VolumeGrid, isovalue: f32) {
        grid.samples_mut()
            .par_iter_mut()
            .for_each(|sample| sample.inside = sample.value > isovalue);
        grid.set_isovalue(isovalue);
    }

    /// Number of samples currently flagged inside.
    pub fn inside_count(grid: &VolumeGrid) -> usize {
        grid.samples().iter().filter(|s| s.inside()).count()
    }
}

impl VolumeGrid {
    /// Shorthand for [`ThresholdClassifier::classify`].
    pub fn classify(&mut self, isovalue: f32) {
        ThresholdClassifier::classify(self, isovalue);
    }
}
