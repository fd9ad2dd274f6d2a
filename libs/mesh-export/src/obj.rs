//! # Wavefront OBJ
//!
//! Each isovalue becomes one `o` object. Every triangle writes its own three
//! `v` lines followed by an `f` line with absolute 1-based indices, so no
//! vertex is shared.

use std::io::Write;

use isosurface::Triangle;

use crate::error::ExportResult;

/// Streams one or more isosurface objects into a single OBJ document.
///
/// # Examples
/// ```
/// use isosurface::{Triangle, Vec3};
/// use mesh_export::obj::ObjWriter;
///
/// let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
/// let mut obj = ObjWriter::new(Vec::new());
/// obj.write_object(1.0, &[tri]).unwrap();
/// obj.write_object(2.0, &[tri]).unwrap();
///
/// let text = String::from_utf8(obj.into_inner()).unwrap();
/// assert!(text.contains("o isosurface_2"));
/// assert!(text.ends_with("f 4 5 6\n"));
/// ```
pub struct ObjWriter<W: Write> {
    writer: W,
    vertices_written: usize,
}

impl<W: Write> ObjWriter<W> {
    /// Wraps a writer; nothing is emitted until the first object.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            vertices_written: 0,
        }
    }

    /// Appends the triangles extracted at `isovalue` as a new object.
    pub fn write_object(&mut self, isovalue: f32, triangles: &[Triangle]) -> ExportResult<()> {
        writeln!(self.writer, "# isosurface at {isovalue}: {} triangles", triangles.len())?;
        writeln!(self.writer, "o isosurface_{isovalue}")?;

        for triangle in triangles {
            for v in triangle.vertices {
                writeln!(self.writer, "v {} {} {}", v.x, v.y, v.z)?;
            }
            let first = self.vertices_written + 1;
            writeln!(self.writer, "f {} {} {}", first, first + 1, first + 2)?;
            self.vertices_written += 3;
        }

        Ok(())
    }

    /// Vertices emitted so far across all objects.
    pub fn vertices_written(&self) -> usize {
        self.vertices_written
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> ExportResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Returns the underlying writer without flushing.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Writes a single-object OBJ document.
pub fn write_obj<W: Write>(writer: &mut W, isovalue: f32, triangles: &[Triangle]) -> ExportResult<()> {
    ObjWriter::new(writer).write_object(isovalue, triangles)
}
