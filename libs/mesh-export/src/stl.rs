//! # Binary STL
//!
//! ```text
//! [80]  header: "isovalue <v>" padded with NUL
//! [4]   triangle count, u32 LE
//! per triangle (50 bytes):
//!   [12] normal      3 x f32 LE
//!   [36] vertices    9 x f32 LE
//!   [2]  attribute   u16, always 0 on write
//! ```

use std::io::Write;

use config::constants::{STL_HEADER_LEN, STL_TRIANGLE_RECORD_LEN};
use isosurface::{Triangle, Vec3};

use crate::error::{ExportError, ExportResult};

const COUNT_LEN: usize = 4;
const PREAMBLE_LEN: usize = STL_HEADER_LEN + COUNT_LEN;

/// Header bytes recording the isovalue, NUL padded and truncated to 80 bytes.
pub fn stl_header(isovalue: f32) -> [u8; STL_HEADER_LEN] {
    let mut header = [0u8; STL_HEADER_LEN];
    let text = format!("isovalue {isovalue}");
    let n = text.len().min(STL_HEADER_LEN);
    header[..n].copy_from_slice(&text.as_bytes()[..n]);
    header
}

/// Serializes triangles to an in-memory binary STL image.
///
/// # Examples
/// ```
/// use isosurface::{Triangle, Vec3};
/// use mesh_export::stl::stl_bytes;
///
/// let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
/// let bytes = stl_bytes(0.5, &[tri]).unwrap();
/// assert_eq!(bytes.len(), 84 + 50);
/// ```
pub fn stl_bytes(isovalue: f32, triangles: &[Triangle]) -> ExportResult<Vec<u8>> {
    let mut out = Vec::with_capacity(PREAMBLE_LEN + triangles.len() * STL_TRIANGLE_RECORD_LEN);
    write_stl(&mut out, isovalue, triangles)?;
    Ok(out)
}

/// Writes a binary STL stream.
///
/// # Errors
///
/// `TooManyTriangles` when the count does not fit the `u32` field, `Io` when
/// the writer fails.
pub fn write_stl<W: Write>(writer: &mut W, isovalue: f32, triangles: &[Triangle]) -> ExportResult<()> {
    let count = u32::try_from(triangles.len()).map_err(|_| ExportError::TooManyTriangles(triangles.len()))?;

    writer.write_all(&stl_header(isovalue))?;
    writer.write_all(&count.to_le_bytes())?;

    let mut record = [0u8; STL_TRIANGLE_RECORD_LEN];
    for triangle in triangles {
        let normal = triangle.normal();
        let floats = std::iter::once(normal).chain(triangle.vertices).flat_map(|v| v.to_array());
        for (slot, value) in record.chunks_exact_mut(4).zip(floats) {
            slot.copy_from_slice(&value.to_le_bytes());
        }
        record[48..].copy_from_slice(&0u16.to_le_bytes());
        writer.write_all(&record)?;
    }

    Ok(())
}

/// One parsed binary STL record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StlTriangle {
    /// Stored facet normal
    pub normal: Vec3,
    /// Vertices in file order
    pub vertices: [Vec3; 3],
    /// Attribute byte count
    pub attribute: u16,
}

/// A parsed binary STL file.
#[derive(Debug, Clone, PartialEq)]
pub struct StlMesh {
    /// Raw 80-byte header
    pub header: [u8; STL_HEADER_LEN],
    /// Triangle records in file order
    pub triangles: Vec<StlTriangle>,
}

impl StlMesh {
    /// Header up to the first NUL, lossily decoded.
    pub fn header_text(&self) -> String {
        let end = self.header.iter().position(|&b| b == 0).unwrap_or(STL_HEADER_LEN);
        String::from_utf8_lossy(&self.header[..end]).into_owned()
    }
}

fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(raw)
}

fn vec3_at(bytes: &[u8], offset: usize) -> Vec3 {
    Vec3::new(f32_at(bytes, offset), f32_at(bytes, offset + 4), f32_at(bytes, offset + 8))
}

/// Parses a binary STL image.
///
/// Bytes past the last record are ignored.
///
/// # Errors
///
/// `Truncated` when the buffer is shorter than the header and the records it
/// announces.
pub fn read_stl(bytes: &[u8]) -> ExportResult<StlMesh> {
    if bytes.len() < PREAMBLE_LEN {
        return Err(ExportError::Truncated {
            expected: PREAMBLE_LEN,
            actual: bytes.len(),
        });
    }

    let mut header = [0u8; STL_HEADER_LEN];
    header.copy_from_slice(&bytes[..STL_HEADER_LEN]);

    let mut raw_count = [0u8; COUNT_LEN];
    raw_count.copy_from_slice(&bytes[STL_HEADER_LEN..PREAMBLE_LEN]);
    let count = u32::from_le_bytes(raw_count) as usize;

    let expected = count
        .checked_mul(STL_TRIANGLE_RECORD_LEN)
        .and_then(|body| body.checked_add(PREAMBLE_LEN))
        .unwrap_or(usize::MAX);
    if bytes.len() < expected {
        return Err(ExportError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    let triangles = bytes[PREAMBLE_LEN..expected]
        .chunks_exact(STL_TRIANGLE_RECORD_LEN)
        .map(|record| StlTriangle {
            normal: vec3_at(record, 0),
            vertices: [vec3_at(record, 12), vec3_at(record, 24), vec3_at(record, 36)],
            attribute: u16::from_le_bytes([record[48], record[49]]),
        })
        .collect();

    Ok(StlMesh { header, triangles })
}
