//! Mesh serialization for extracted isosurfaces.
//!
//! Two formats are supported, binary STL and Wavefront OBJ. Both take the
//! isovalue and the triangle soup as produced by the extractor; neither
//! welds vertices.

pub mod error;
pub mod obj;
pub mod stl;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use isosurface::Triangle;
use log::debug;

pub use error::{ExportError, ExportResult};
pub use obj::{write_obj, ObjWriter};
pub use stl::{read_stl, write_stl, StlMesh, StlTriangle};

/// Output mesh format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeshFormat {
    /// Binary STL
    Stl,
    /// Wavefront OBJ
    #[default]
    Obj,
}

impl MeshFormat {
    /// File extension without the leading dot.
    ///
    /// # Examples
    /// ```
    /// use mesh_export::MeshFormat;
    /// assert_eq!(MeshFormat::Stl.extension(), "stl");
    /// assert_eq!("OBJ".parse::<MeshFormat>().unwrap(), MeshFormat::Obj);
    /// ```
    pub fn extension(self) -> &'static str {
        match self {
            MeshFormat::Stl => "stl",
            MeshFormat::Obj => "obj",
        }
    }
}

impl std::fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MeshFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stl" => Ok(MeshFormat::Stl),
            "obj" => Ok(MeshFormat::Obj),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Writes one isosurface in `format` to any writer.
pub fn write_mesh<W: Write>(
    writer: &mut W,
    format: MeshFormat,
    isovalue: f32,
    triangles: &[Triangle],
) -> ExportResult<()> {
    match format {
        MeshFormat::Stl => write_stl(writer, isovalue, triangles),
        MeshFormat::Obj => write_obj(writer, isovalue, triangles),
    }
}

/// Creates (or truncates) `path` and writes one isosurface to it.
pub fn export_to_path(
    format: MeshFormat,
    path: impl AsRef<Path>,
    isovalue: f32,
    triangles: &[Triangle],
) -> ExportResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_mesh(&mut writer, format, isovalue, triangles)?;
    writer.flush()?;
    debug!("wrote {} triangles as {} to {}", triangles.len(), format, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use isosurface::Vec3;

    #[test]
    fn format_parsing() {
        assert_eq!("stl".parse::<MeshFormat>().unwrap(), MeshFormat::Stl);
        assert_eq!("Obj".parse::<MeshFormat>().unwrap(), MeshFormat::Obj);
        assert!(matches!("ply".parse::<MeshFormat>(), Err(ExportError::UnknownFormat(_))));
        assert_eq!(MeshFormat::default(), MeshFormat::Obj);
        assert_eq!(MeshFormat::Obj.to_string(), "obj");
    }

    #[test]
    fn write_mesh_dispatches_on_format() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);

        let mut stl = Vec::new();
        write_mesh(&mut stl, MeshFormat::Stl, 1.0, &[tri]).unwrap();
        assert_eq!(stl.len(), 134);

        let mut obj = Vec::new();
        write_mesh(&mut obj, MeshFormat::Obj, 1.0, &[tri]).unwrap();
        assert!(String::from_utf8(obj).unwrap().contains("f 1 2 3"));
    }

    #[test]
    fn export_to_path_writes_file() {
        let dir = std::env::temp_dir().join(format!("mesh-export-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tri.stl");

        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        export_to_path(MeshFormat::Stl, &path, 0.25, &[tri]).unwrap();

        let mesh = read_stl(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(mesh.header_text(), "isovalue 0.25");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn export_to_missing_directory_is_io_error() {
        let path = std::env::temp_dir()
            .join(format!("mesh-export-missing-{}", std::process::id()))
            .join("nested")
            .join("out.obj");
        let err = export_to_path(MeshFormat::Obj, &path, 0.0, &[]).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
