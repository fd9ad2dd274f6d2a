//! # Tests for Config Constants
//!
//! Unit tests verifying the correctness of configuration constants
//! and helper functions.

use crate::constants::*;

// =============================================================================
// TOPOLOGY TESTS
// =============================================================================

#[test]
fn test_case_count_covers_every_corner_code() {
    assert_eq!(CASE_COUNT, 1usize << CORNER_COUNT);
}

#[test]
fn test_tri_table_row_fits_max_triangles() {
    // Five triples plus at least one terminator slot
    assert!(TRI_TABLE_ROW_LEN > MAX_TRIANGLES_PER_CUBE * 3);
}

#[test]
fn test_cube_has_twelve_edges() {
    assert_eq!(EDGE_COUNT, 12);
}

// =============================================================================
// MESH LAYOUT TESTS
// =============================================================================

#[test]
fn test_stl_record_len_matches_layout() {
    let floats = 3 + 3 * 3;
    assert_eq!(STL_TRIANGLE_RECORD_LEN, floats * 4 + 2);
}

#[test]
fn test_stl_header_len() {
    assert_eq!(STL_HEADER_LEN, 80);
}

// =============================================================================
// GLOBAL CONFIG TESTS
// =============================================================================

#[test]
fn test_default_config_is_sequential() {
    let cfg = GlobalConfig::default();
    assert!(!cfg.parallel);
    assert_eq!(cfg.min_parallel_cubes, DEFAULT_MIN_PARALLEL_CUBES);
}

#[test]
fn test_config_rejects_zero_threshold() {
    let err = GlobalConfig::new(true, 0).unwrap_err();
    assert_eq!(err, ConfigError::InvalidParallelThreshold(0));
    assert!(err.to_string().contains("min_parallel_cubes"));
}

#[test]
fn test_config_accepts_valid_threshold() {
    let cfg = GlobalConfig::new(true, 1).unwrap();
    assert!(cfg.parallel);
    assert_eq!(cfg.min_parallel_cubes, 1);
}

// =============================================================================
// APPROX_EQUAL TESTS
// =============================================================================

#[test]
fn test_approx_equal_same_values() {
    assert!(approx_equal(0.5, 0.5));
}

#[test]
fn test_approx_equal_rejects_distant_values() {
    assert!(!approx_equal(0.5, 0.5001));
}
