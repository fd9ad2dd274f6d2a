//! Geometry primitives shared by the engine and the exporters.
//!
//! Positions use `glam::Vec3` (f32), the precision of both the sampled
//! volumes and binary STL output.

pub use glam::Vec3;

/// One output triangle. Vertex order is the order of the case table and
/// defines the winding.
///
/// # Examples
/// ```
/// use isosurface::{Triangle, Vec3};
///
/// let t = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
/// assert_eq!(t.normal(), Vec3::new(0.0, 0.0, -1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The three corners, in emission order.
    pub vertices: [Vec3; 3],
}

impl Triangle {
    /// Creates a triangle from three points.
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        Self {
            vertices: [v1, v2, v3],
        }
    }

    /// Facet normal `normalize((v3 - v1) x (v2 - v1))`.
    ///
    /// With inside meaning "value above the isovalue" this points out of the
    /// inside region. Degenerate triangles yield the zero vector.
    pub fn normal(&self) -> Vec3 {
        let [v1, v2, v3] = self.vertices;
        (v3 - v1).cross(v2 - v1).normalize_or_zero()
    }

    /// Surface area.
    pub fn area(&self) -> f32 {
        let [v1, v2, v3] = self.vertices;
        0.5 * (v2 - v1).cross(v3 - v1).length()
    }

    /// Returns true when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|v| v.is_finite())
    }
}

/// Parameter `t` of the isovalue crossing along an edge from `v0` to `v1`.
///
/// A flat edge (`v0 == v1`) yields `t = 0` instead of dividing by zero.
/// The result is not clamped, so non-finite samples propagate.
#[inline]
pub fn edge_parameter(v0: f32, v1: f32, isovalue: f32) -> f32 {
    let denom = v1 - v0;
    if denom == 0.0 {
        return 0.0;
    }
    (isovalue - v0) / denom
}

/// Linearly interpolates the isovalue crossing between two samples.
///
/// # Examples
/// ```
/// use isosurface::geometry::{interpolate_edge, Vec3};
///
/// let p = interpolate_edge(Vec3::ZERO, 0.0, Vec3::Z, 1.0, 0.5);
/// assert_eq!(p, Vec3::new(0.0, 0.0, 0.5));
/// ```
#[inline]
pub fn interpolate_edge(p0: Vec3, v0: f32, p1: Vec3, v1: f32, isovalue: f32) -> Vec3 {
    let t = edge_parameter(v0, v1, isovalue);
    // Same point as p0 + t * (p1 - p0), but exact at both endpoints
    p0 * (1.0 - t) + p1 * t
}
