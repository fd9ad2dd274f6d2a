//! # Isosurface Extraction
//!
//! Marches every cube of a classified [`VolumeGrid`], looks its corner code
//! up in the case tables and emits interpolated triangles.
//!
//! ## Pipeline
//!
//! ```text
//! corner flags → code (8 bits) → EDGE_TABLE → interpolate crossed edges
//!                                TRI_TABLE  → triangles in table order
//! ```
//!
//! Vertices are not shared between cubes. Each crossed edge is always
//! interpolated from its lower-index sample to its higher-index sample, so
//! neighbouring cubes produce bit-identical points on the edges they share.

use log::debug;
use rayon::prelude::*;

use config::constants::{CORNER_COUNT, EDGE_COUNT};

use crate::config::ExtractionConfig;
use crate::error::{IsosurfaceError, IsosurfaceResult};
use crate::geometry::{interpolate_edge, Triangle, Vec3};
use crate::grid::VolumeGrid;
use crate::tables::{triangles_for, CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE};

/// Counters from one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Cubes visited.
    pub cubes: usize,
    /// Cubes whose code was neither 0 nor 255.
    pub active_cubes: usize,
    /// Triangles emitted.
    pub triangles: usize,
}

impl ExtractionStats {
    fn merge(self, other: Self) -> Self {
        Self {
            cubes: self.cubes + other.cubes,
            active_cubes: self.active_cubes + other.active_cubes,
            triangles: self.triangles + other.triangles,
        }
    }
}

/// Extracts triangles from a grid classified at one isovalue.
///
/// # Examples
/// ```
/// use isosurface::{GridDims, IsosurfaceExtractor, Vec3, VolumeGrid};
///
/// let values = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
/// let mut grid = VolumeGrid::new(GridDims::new(2, 2, 2), Vec3::ONE, Vec3::ZERO, values).unwrap();
/// grid.classify(0.5);
///
/// let triangles = IsosurfaceExtractor::new(&grid).unwrap().extract();
/// assert_eq!(triangles.len(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IsosurfaceExtractor<'a> {
    grid: &'a VolumeGrid,
    isovalue: f32,
    /// Flat sample offset of each cube corner from the cube's base sample.
    corner_offsets: [usize; CORNER_COUNT],
}

impl<'a> IsosurfaceExtractor<'a> {
    /// Creates an extractor for the grid's current classification.
    ///
    /// # Errors
    ///
    /// `Unclassified` when the grid has never been classified.
    pub fn new(grid: &'a VolumeGrid) -> IsosurfaceResult<Self> {
        let isovalue = grid.isovalue().ok_or(IsosurfaceError::Unclassified)?;
        Ok(Self::with_isovalue(grid, isovalue))
    }

    fn with_isovalue(grid: &'a VolumeGrid, isovalue: f32) -> Self {
        let dims = grid.dims();
        let layer = dims.size_x * dims.size_y;
        let corner_offsets = CORNER_OFFSETS.map(|[dx, dy, dz]| dx + dy * dims.size_x + dz * layer);
        Self {
            grid,
            isovalue,
            corner_offsets,
        }
    }

    /// The isovalue the grid was classified against.
    pub fn isovalue(&self) -> f32 {
        self.isovalue
    }

    /// Corner code of cube `(x, y, z)`: bit `k` is set when corner `k` is
    /// inside.
    pub fn cube_code(&self, x: usize, y: usize, z: usize) -> u8 {
        self.code_at(self.grid.index(x, y, z))
    }

    /// Extracts the surface sequentially, z-slab by z-slab.
    pub fn extract(&self) -> Vec<Triangle> {
        self.extract_with_stats().0
    }

    /// Sequential extraction that also returns pass counters.
    pub fn extract_with_stats(&self) -> (Vec<Triangle>, ExtractionStats) {
        let [_, _, slabs] = self.grid.cube_dims();
        let mut triangles = Vec::new();
        let mut stats = ExtractionStats::default();
        for z in 0..slabs {
            stats = stats.merge(self.march_slab(z, &mut triangles));
        }
        self.log_stats(&stats, false);
        (triangles, stats)
    }

    /// Extracts the surface with one rayon task per z-slab.
    ///
    /// Each task fills a private buffer; buffers are joined in slab order, so
    /// the output equals [`extract`](Self::extract).
    pub fn extract_parallel(&self) -> Vec<Triangle> {
        self.extract_parallel_with_stats().0
    }

    /// Parallel extraction that also returns pass counters.
    pub fn extract_parallel_with_stats(&self) -> (Vec<Triangle>, ExtractionStats) {
        let [_, _, slabs] = self.grid.cube_dims();
        let parts: Vec<(Vec<Triangle>, ExtractionStats)> = (0..slabs)
            .into_par_iter()
            .map(|z| {
                let mut buffer = Vec::new();
                let stats = self.march_slab(z, &mut buffer);
                (buffer, stats)
            })
            .collect();

        let total: usize = parts.iter().map(|(buffer, _)| buffer.len()).sum();
        let mut triangles = Vec::with_capacity(total);
        let mut stats = ExtractionStats::default();
        for (buffer, part) in parts {
            triangles.extend(buffer);
            stats = stats.merge(part);
        }
        self.log_stats(&stats, true);
        (triangles, stats)
    }

    fn log_stats(&self, stats: &ExtractionStats, parallel: bool) {
        debug!(
            "isovalue {}: {} cubes, {} active, {} triangles (parallel: {})",
            self.isovalue, stats.cubes, stats.active_cubes, stats.triangles, parallel
        );
    }

    fn march_slab(&self, z: usize, out: &mut Vec<Triangle>) -> ExtractionStats {
        let [cubes_x, cubes_y, _] = self.grid.cube_dims();
        let mut stats = ExtractionStats::default();
        for y in 0..cubes_y {
            for x in 0..cubes_x {
                let emitted = self.march_cube(self.grid.index(x, y, z), out);
                stats.cubes += 1;
                if emitted > 0 {
                    stats.active_cubes += 1;
                    stats.triangles += emitted;
                }
            }
        }
        stats
    }

    #[inline]
    fn code_at(&self, base: usize) -> u8 {
        let samples = self.grid.samples();
        self.corner_offsets
            .iter()
            .enumerate()
            .filter(|&(_, &offset)| samples[base + offset].inside())
            .fold(0u8, |code, (corner, _)| code | (1 << corner))
    }

    /// Emits the triangles of the cube whose corner 0 is sample `base` and
    /// returns how many were pushed.
    fn march_cube(&self, base: usize, out: &mut Vec<Triangle>) -> usize {
        let code = self.code_at(base);
        if code == 0 || code == u8::MAX {
            return 0;
        }

        let samples = self.grid.samples();
        let crossed = EDGE_TABLE[code as usize];
        let mut points = [Vec3::ZERO; EDGE_COUNT];
        for (edge, &(a, b)) in EDGE_CORNERS.iter().enumerate() {
            if crossed & (1u16 << edge) == 0 {
                continue;
            }
            let (lo, hi) = if self.corner_offsets[a] < self.corner_offsets[b] {
                (a, b)
            } else {
                (b, a)
            };
            let s0 = &samples[base + self.corner_offsets[lo]];
            let s1 = &samples[base + self.corner_offsets[hi]];
            points[edge] = interpolate_edge(s0.position, s0.value, s1.position, s1.value, self.isovalue);
        }

        let before = out.len();
        out.extend(
            triangles_for(code).map(|[e0, e1, e2]| Triangle::new(points[e0], points[e1], points[e2])),
        );
        out.len() - before
    }
}

/// Classifies `grid` at `isovalue` and extracts the surface in one call.
///
/// The parallel paths are used when `config` asks for them and the grid has
/// at least `config.min_parallel_cubes` cubes.
///
/// # Examples
/// ```
/// use isosurface::{extract_isosurface, ExtractionConfig, GridDims, Vec3, VolumeGrid};
///
/// let mut grid = VolumeGrid::new(GridDims::new(2, 2, 2), Vec3::ONE, Vec3::ZERO, vec![3.0; 8]).unwrap();
/// let triangles = extract_isosurface(&mut grid, 1.0, &ExtractionConfig::default());
/// assert!(triangles.is_empty());
/// ```
pub fn extract_isosurface(grid: &mut VolumeGrid, isovalue: f32, config: &ExtractionConfig) -> Vec<Triangle> {
    if config.should_parallelize(grid.cube_count()) {
        crate::classifier::ThresholdClassifier::classify_parallel(grid, isovalue);
        IsosurfaceExtractor::with_isovalue(grid, isovalue).extract_parallel()
    } else {
        grid.classify(isovalue);
        IsosurfaceExtractor::with_isovalue(grid, isovalue).extract()
    }
}

#[cfg(test)]
mod tests;
