//! # Volume Grid
//!
//! Flat, contiguously owned storage for a regular scalar field.
//!
//! Samples are stored x-fastest: sample `(x, y, z)` lives at
//! `x + y * size_x + z * size_x * size_y`. Positions are computed once at
//! construction as `origin + step * index` and never change; only the
//! per-sample `inside` flag is rewritten by each classification pass.

use crate::error::{IsosurfaceError, IsosurfaceResult};
use crate::geometry::Vec3;

/// Sample counts along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    /// Samples along x
    pub size_x: usize,
    /// Samples along y
    pub size_y: usize,
    /// Samples along z
    pub size_z: usize,
}

impl GridDims {
    /// Creates grid dimensions.
    pub fn new(size_x: usize, size_y: usize, size_z: usize) -> Self {
        Self {
            size_x,
            size_y,
            size_z,
        }
    }

    /// Total number of samples, or `None` on overflow.
    pub fn sample_count(&self) -> Option<usize> {
        self.size_x
            .checked_mul(self.size_y)?
            .checked_mul(self.size_z)
    }

    /// Number of cubes along each axis (`size - 1`, or 0 for a flat axis).
    pub fn cube_dims(&self) -> [usize; 3] {
        [
            self.size_x.saturating_sub(1),
            self.size_y.saturating_sub(1),
            self.size_z.saturating_sub(1),
        ]
    }

    /// Total number of cubes.
    pub fn cube_count(&self) -> usize {
        self.cube_dims().iter().product()
    }
}

/// One grid sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// World position, fixed at construction.
    pub position: Vec3,
    /// Scalar value.
    pub value: f32,
    pub(crate) inside: bool,
}

impl Sample {
    /// Whether the last classification put this sample inside the surface.
    #[inline]
    pub fn inside(&self) -> bool {
        self.inside
    }
}

/// A regular scalar grid plus its classification state.
///
/// # Examples
/// ```
/// use isosurface::{GridDims, Vec3, VolumeGrid};
///
/// let grid = VolumeGrid::new(
///     GridDims::new(2, 2, 2),
///     Vec3::ONE,
///     Vec3::ZERO,
///     vec![0.0; 8],
/// ).unwrap();
/// assert_eq!(grid.len(), 8);
/// assert_eq!(grid.cube_count(), 1);
/// assert_eq!(grid.sample(1, 1, 1).position, Vec3::ONE);
/// ```
#[derive(Debug, Clone)]
pub struct VolumeGrid {
    dims: GridDims,
    step: Vec3,
    origin: Vec3,
    samples: Vec<Sample>,
    /// Isovalue the `inside` flags currently encode.
    isovalue: Option<f32>,
}

impl VolumeGrid {
    /// Builds a grid from dimensions, spacing, origin and x-fastest values.
    ///
    /// # Errors
    ///
    /// - `InvalidDimensions` when any size is 0 or the count overflows
    /// - `InvalidSpacing` when any step is zero or not finite
    /// - `SampleCountMismatch` when `values.len()` differs from the sample count
    pub fn new(dims: GridDims, step: Vec3, origin: Vec3, values: Vec<f32>) -> IsosurfaceResult<Self> {
        let count = match dims.sample_count() {
            Some(count) if count > 0 => count,
            _ => {
                return Err(IsosurfaceError::InvalidDimensions {
                    size_x: dims.size_x,
                    size_y: dims.size_y,
                    size_z: dims.size_z,
                })
            }
        };

        for (axis, value) in [("x", step.x), ("y", step.y), ("z", step.z)] {
            if value == 0.0 || !value.is_finite() {
                return Err(IsosurfaceError::InvalidSpacing { axis, step: value });
            }
        }

        if values.len() != count {
            return Err(IsosurfaceError::SampleCountMismatch {
                expected: count,
                actual: values.len(),
            });
        }

        let layer = dims.size_x * dims.size_y;
        let samples = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let x = i % dims.size_x;
                let y = (i % layer) / dims.size_x;
                let z = i / layer;
                let index = Vec3::new(x as f32, y as f32, z as f32);
                Sample {
                    position: origin + step * index,
                    value,
                    inside: false,
                }
            })
            .collect();

        Ok(Self {
            dims,
            step,
            origin,
            samples,
            isovalue: None,
        })
    }

    /// Grid dimensions.
    #[inline]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Spacing between neighbouring samples.
    #[inline]
    pub fn step(&self) -> Vec3 {
        self.step
    }

    /// Position of sample `(0, 0, 0)`.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the grid holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Flat index of sample `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.dims.size_x + z * self.dims.size_x * self.dims.size_y
    }

    /// Sample at `(x, y, z)`. Panics when out of range.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, z: usize) -> &Sample {
        &self.samples[self.index(x, y, z)]
    }

    /// All samples in storage order.
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub(crate) fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    /// Number of cubes along each axis.
    #[inline]
    pub fn cube_dims(&self) -> [usize; 3] {
        self.dims.cube_dims()
    }

    /// Total number of cubes; zero when any axis has a single sample.
    #[inline]
    pub fn cube_count(&self) -> usize {
        self.dims.cube_count()
    }

    /// Isovalue of the last classification pass, `None` before the first.
    #[inline]
    pub fn isovalue(&self) -> Option<f32> {
        self.isovalue
    }

    #[inline]
    pub(crate) fn set_isovalue(&mut self, isovalue: f32) {
        self.isovalue = Some(isovalue);
    }

    /// Minimum and maximum of the finite sample values, `None` if there are
    /// none.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .map(|s| s.value)
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
