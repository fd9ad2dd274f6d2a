//! Consistency tests for the case tables.
//!
//! A single wrong entry only breaks the surface for that configuration, so
//! every code is checked against properties derivable from the corner code.

use super::*;
use config::constants::MAX_TRIANGLES_PER_CUBE;

/// Edge mask implied by a corner code: an edge is crossed exactly when its
/// two corners disagree.
fn mask_from_corners(code: u8) -> u16 {
    EDGE_CORNERS
        .iter()
        .enumerate()
        .filter(|&(_, &(a, b))| ((code >> a) & 1) != ((code >> b) & 1))
        .fold(0u16, |mask, (edge, _)| mask | (1u16 << edge))
}

#[test]
fn edge_table_matches_triangle_table() {
    for code in 0..=255u8 {
        let referenced = triangles_for(code)
            .flatten()
            .fold(0u16, |mask, edge| mask | (1u16 << edge));
        assert_eq!(
            EDGE_TABLE[code as usize], referenced,
            "edge/triangle mismatch for code {code}"
        );
    }
}

#[test]
fn edge_table_matches_corner_code() {
    for code in 0..=255u8 {
        assert_eq!(
            EDGE_TABLE[code as usize],
            mask_from_corners(code),
            "edge mask disagrees with corners for code {code}"
        );
    }
}

#[test]
fn only_trivial_codes_are_empty() {
    for code in 0..=255u8 {
        let empty_edges = EDGE_TABLE[code as usize] == 0;
        let empty_tris = triangles_for(code).next().is_none();
        let trivial = code == 0 || code == 255;
        assert_eq!(empty_edges, trivial, "edge table emptiness for code {code}");
        assert_eq!(empty_tris, trivial, "triangle table emptiness for code {code}");
    }
}

#[test]
fn rows_are_well_formed() {
    for (code, row) in TRI_TABLE.iter().enumerate() {
        let used = row.iter().take_while(|&&e| e >= 0).count();
        assert_eq!(used % 3, 0, "partial triple in code {code}");
        assert!(used <= MAX_TRIANGLES_PER_CUBE * 3, "too many triangles in code {code}");
        assert!(row[used..].iter().all(|&e| e == -1), "garbage after terminator in code {code}");
        assert!(row[..used].iter().all(|&e| (e as usize) < EDGE_CORNERS.len()));
    }
}

#[test]
fn triangles_never_repeat_an_edge() {
    for code in 0..=255u8 {
        for [a, b, c] in triangles_for(code) {
            assert!(a != b && b != c && a != c, "degenerate triple in code {code}");
        }
    }
}

#[test]
fn single_corner_cases_emit_one_triangle() {
    for corner in 0..8 {
        let code = 1u8 << corner;
        let tris: Vec<_> = triangles_for(code).collect();
        assert_eq!(tris.len(), 1, "corner {corner}");

        // The triangle touches exactly the three edges incident to the corner
        let mut edges: Vec<usize> = tris[0].to_vec();
        edges.sort_unstable();
        let mut expected: Vec<usize> = EDGE_CORNERS
            .iter()
            .enumerate()
            .filter(|&(_, &(a, b))| a == corner || b == corner)
            .map(|(edge, _)| edge)
            .collect();
        expected.sort_unstable();
        assert_eq!(edges, expected, "corner {corner}");
    }
}

#[test]
fn single_edge_case_emits_quad() {
    // Corners 0 and 1 inside: edge 0 lies fully inside, four edges crossed
    let tris: Vec<_> = triangles_for(0b0000_0011).collect();
    assert_eq!(tris, vec![[1, 8, 3], [9, 8, 1]]);
    assert_eq!(EDGE_TABLE[3], (1 << 1) | (1 << 3) | (1 << 8) | (1 << 9));
}

#[test]
fn top_face_inside_crosses_vertical_edges() {
    let tris: Vec<_> = triangles_for(0b1111_0000).collect();
    assert_eq!(tris, vec![[9, 10, 8], [10, 11, 8]]);
    assert_eq!(EDGE_TABLE[0xF0], 0xF00);
}

#[test]
fn complementary_codes_cross_same_edges() {
    for code in 0..=255u8 {
        assert_eq!(EDGE_TABLE[code as usize], EDGE_TABLE[(!code) as usize]);
    }
}

#[test]
fn corner_offsets_match_edge_directions() {
    // Every edge joins corners that differ in exactly one axis
    for &(a, b) in EDGE_CORNERS.iter() {
        let pa = CORNER_OFFSETS[a];
        let pb = CORNER_OFFSETS[b];
        let diff: usize = (0..3).map(|i| pa[i].abs_diff(pb[i])).sum();
        assert_eq!(diff, 1, "edge {a}-{b}");
    }
}

#[test]
fn edge_crossed_reads_mask_bits() {
    assert!(edge_crossed(1, 0));
    assert!(edge_crossed(1, 3));
    assert!(edge_crossed(1, 8));
    assert!(!edge_crossed(1, 1));
    assert!(!edge_crossed(0, 0));
}
