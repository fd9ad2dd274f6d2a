//! Tests for cube marching and triangle emission.

use std::collections::HashMap;

use approx::assert_relative_eq;

use super::*;
use crate::grid::GridDims;

fn grid_from(dims: GridDims, values: Vec<f32>) -> VolumeGrid {
    VolumeGrid::new(dims, Vec3::ONE, Vec3::ZERO, values).unwrap()
}

/// Unit cube with the bottom face (z = 0) at 0 and the top face at 1.
fn single_cube() -> VolumeGrid {
    grid_from(GridDims::new(2, 2, 2), vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0])
}

/// `n`³ samples over `[-1, 1]`³ of `radius - |p - center|`.
fn sphere(n: usize, radius: f32, center: Vec3) -> VolumeGrid {
    let step = 2.0 / (n - 1) as f32;
    let origin = Vec3::splat(-1.0);
    let mut values = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let p = origin + Vec3::new(x as f32, y as f32, z as f32) * step;
                values.push(radius - (p - center).length());
            }
        }
    }
    VolumeGrid::new(GridDims::new(n, n, n), Vec3::splat(step), origin, values).unwrap()
}

#[test]
fn single_cube_yields_horizontal_square() {
    let mut grid = single_cube();
    grid.classify(0.5);
    let extractor = IsosurfaceExtractor::new(&grid).unwrap();

    assert_eq!(extractor.cube_code(0, 0, 0), 0xF0);

    let triangles = extractor.extract();
    assert_eq!(triangles.len(), 2);
    for triangle in &triangles {
        for v in triangle.vertices {
            assert_relative_eq!(v.z, 0.5);
            assert!(v.x == 0.0 || v.x == 1.0);
            assert!(v.y == 0.0 || v.y == 1.0);
        }
    }

    let area: f32 = triangles.iter().map(Triangle::area).sum();
    assert_relative_eq!(area, 1.0, epsilon = 1e-6);
}

#[test]
fn single_cube_triangles_follow_table_order() {
    let mut grid = single_cube();
    grid.classify(0.5);
    let triangles = IsosurfaceExtractor::new(&grid).unwrap().extract();

    // Edges 9, 10, 8 then 10, 11, 8.
    let e8 = Vec3::new(0.0, 0.0, 0.5);
    let e9 = Vec3::new(1.0, 0.0, 0.5);
    let e10 = Vec3::new(1.0, 1.0, 0.5);
    let e11 = Vec3::new(0.0, 1.0, 0.5);
    assert_eq!(triangles[0].vertices, [e9, e10, e8]);
    assert_eq!(triangles[1].vertices, [e10, e11, e8]);
}

#[test]
fn single_cube_normals_point_out_of_high_region() {
    let mut grid = single_cube();
    grid.classify(0.5);
    for triangle in IsosurfaceExtractor::new(&grid).unwrap().extract() {
        assert_relative_eq!(triangle.normal().z, -1.0);
    }
}

#[test]
fn unclassified_grid_is_an_error() {
    let grid = single_cube();
    let err = IsosurfaceExtractor::new(&grid).unwrap_err();
    assert_eq!(err, IsosurfaceError::Unclassified);
}

#[test]
fn uniform_field_has_no_surface() {
    let dims = GridDims::new(4, 4, 4);
    let mut grid = grid_from(dims, vec![2.0; 64]);

    grid.classify(1.0);
    let (triangles, stats) = IsosurfaceExtractor::new(&grid).unwrap().extract_with_stats();
    assert!(triangles.is_empty());
    assert_eq!(stats.cubes, 27);
    assert_eq!(stats.active_cubes, 0);

    grid.classify(3.0);
    assert!(IsosurfaceExtractor::new(&grid).unwrap().extract().is_empty());
}

#[test]
fn isovalue_equal_to_field_has_no_surface() {
    let mut grid = grid_from(GridDims::new(3, 3, 3), vec![1.0; 27]);
    grid.classify(1.0);
    assert!(IsosurfaceExtractor::new(&grid).unwrap().extract().is_empty());
}

#[test]
fn flat_grid_has_no_cubes() {
    let mut grid = grid_from(GridDims::new(4, 4, 1), (0..16).map(|i| i as f32).collect());
    grid.classify(7.5);
    let (triangles, stats) = IsosurfaceExtractor::new(&grid).unwrap().extract_with_stats();
    assert!(triangles.is_empty());
    assert_eq!(stats, ExtractionStats::default());
}

#[test]
fn extraction_is_repeatable() {
    let mut grid = sphere(9, 0.7, Vec3::ZERO);
    grid.classify(0.0);
    let extractor = IsosurfaceExtractor::new(&grid).unwrap();
    assert_eq!(extractor.extract(), extractor.extract());
}

#[test]
fn vertex_on_sample_equal_to_isovalue_is_exact() {
    // Corner 0 at 1, the rest at 0: code 1, crossing edges 0, 8 and 3.
    let mut values = vec![0.0; 8];
    values[0] = 1.0;
    let mut grid = grid_from(GridDims::new(2, 2, 2), values);
    grid.classify(0.0);
    let extractor = IsosurfaceExtractor::new(&grid).unwrap();
    assert_eq!(extractor.cube_code(0, 0, 0), 1);

    let triangles = extractor.extract();
    assert_eq!(triangles.len(), 1);
    assert_eq!(
        triangles[0].vertices,
        [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)]
    );
}

#[test]
fn stats_count_active_cubes_and_triangles() {
    let mut grid = sphere(12, 0.6, Vec3::ZERO);
    grid.classify(0.0);
    let (triangles, stats) = IsosurfaceExtractor::new(&grid).unwrap().extract_with_stats();
    assert_eq!(stats.cubes, 11 * 11 * 11);
    assert_eq!(stats.triangles, triangles.len());
    assert!(stats.active_cubes > 0);
    assert!(stats.active_cubes <= stats.triangles);
}

#[test]
fn sphere_vertices_lie_near_radius() {
    let radius = 0.6;
    let mut grid = sphere(17, radius, Vec3::ZERO);
    grid.classify(0.0);
    let triangles = IsosurfaceExtractor::new(&grid).unwrap().extract();
    assert!(!triangles.is_empty());

    let tolerance = grid.step().x * 0.5;
    for triangle in &triangles {
        assert!(triangle.is_finite());
        for v in triangle.vertices {
            assert!((v.length() - radius).abs() < tolerance, "vertex {v} off the sphere");
        }
    }
}

#[test]
fn sphere_normals_point_outward() {
    let mut grid = sphere(17, 0.6, Vec3::ZERO);
    grid.classify(0.0);
    let triangles = IsosurfaceExtractor::new(&grid).unwrap().extract();

    // The field is high inside, so normals face away from the centre.
    let outward = triangles
        .iter()
        .filter(|t| t.area() > 1e-6)
        .filter(|t| {
            let centroid = (t.vertices[0] + t.vertices[1] + t.vertices[2]) / 3.0;
            t.normal().dot(centroid) > 0.0
        })
        .count();
    let total = triangles.iter().filter(|t| t.area() > 1e-6).count();
    assert_eq!(outward, total);
}

#[test]
fn shared_edges_are_bit_identical() {
    let mut grid = sphere(13, 0.55, Vec3::new(0.03, -0.02, 0.01));
    grid.classify(0.0);
    let triangles = IsosurfaceExtractor::new(&grid).unwrap().extract();

    let key = |v: Vec3| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()];
    let mut edges: HashMap<([u32; 3], [u32; 3]), usize> = HashMap::new();
    for triangle in &triangles {
        let [a, b, c] = triangle.vertices.map(key);
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let edge = if p < q { (p, q) } else { (q, p) };
            *edges.entry(edge).or_default() += 1;
        }
    }

    // A closed surface well inside the grid: every edge has two faces.
    assert!(!edges.is_empty());
    assert!(edges.values().all(|&count| count == 2));
}

#[test]
fn parallel_matches_sequential() {
    let mut grid = sphere(15, 0.8, Vec3::new(0.1, 0.0, -0.1));
    grid.classify(0.0);
    let extractor = IsosurfaceExtractor::new(&grid).unwrap();

    let (sequential, seq_stats) = extractor.extract_with_stats();
    let (parallel, par_stats) = extractor.extract_parallel_with_stats();
    assert_eq!(sequential, parallel);
    assert_eq!(seq_stats, par_stats);
}

#[test]
fn extract_isosurface_classifies_then_extracts() {
    let mut grid = single_cube();
    let triangles = extract_isosurface(&mut grid, 0.5, &ExtractionConfig::sequential());
    assert_eq!(triangles.len(), 2);
    assert_eq!(grid.isovalue(), Some(0.5));
}

#[test]
fn extract_isosurface_parallel_path_matches() {
    let mut seq_grid = sphere(11, 0.5, Vec3::ZERO);
    let mut par_grid = seq_grid.clone();

    let seq = extract_isosurface(&mut seq_grid, 0.1, &ExtractionConfig::sequential());
    let par = extract_isosurface(&mut par_grid, 0.1, &ExtractionConfig::new(true, 1).unwrap());
    assert_eq!(seq, par);
    assert_eq!(par_grid.isovalue(), Some(0.1));
}

#[test]
fn reclassifying_changes_the_surface() {
    let mut grid = sphere(11, 0.8, Vec3::ZERO);
    let outer = extract_isosurface(&mut grid, 0.0, &ExtractionConfig::default());
    let inner = extract_isosurface(&mut grid, 0.4, &ExtractionConfig::default());

    let mean_radius = |triangles: &[Triangle]| {
        let sum: f32 = triangles.iter().map(|t| t.vertices[0].length()).sum();
        sum / triangles.len() as f32
    };
    assert!(mean_radius(&inner) < mean_radius(&outer));
}
