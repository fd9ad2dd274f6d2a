//! Batch isosurface generation.
//!
//! Each input volume is read once, turned into a grid once, then classified
//! and extracted for every requested isovalue. OBJ output keeps one document
//! per input, `<stem>.obj`, holding one object per isovalue. STL holds a
//! single mesh, so every (volume, isovalue) pair gets `<stem>_<isovalue>.stl`.
//!
//! Failures are isolated per input file: the error is logged and recorded in
//! the [`BatchReport`] and the remaining files are still processed.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use log::{error, info};

use isosurface::{extract_isosurface, ExtractionConfig};
use mesh_export::{export_to_path, MeshFormat, ObjWriter};
use volume_source::{GradsSource, VolumeDataSource};

/// Descriptor extension scanned for in input directories.
pub const DESCRIPTOR_EXTENSION: &str = "ctl";

/// Settings shared by every file of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Isovalues extracted from each volume, in order
    pub isovalues: Vec<f32>,
    /// Mesh file format
    pub format: MeshFormat,
    /// Sequential or parallel extraction
    pub extraction: ExtractionConfig,
}

/// One written mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputReport {
    /// Isovalue the mesh was extracted at
    pub isovalue: f32,
    /// Written file
    pub path: PathBuf,
    /// Triangle count
    pub triangles: usize,
}

/// A successfully processed input.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Input descriptor
    pub input: PathBuf,
    /// Meshes written for it, in isovalue order
    pub outputs: Vec<OutputReport>,
}

/// Outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Inputs that produced all of their meshes
    pub processed: Vec<FileReport>,
    /// Inputs that failed, with the rendered error chain
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// True when no input failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Lists the descriptors named by `input`: the file itself, or the `.ctl`
/// files directly inside a directory in sorted order.
pub fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input {} is neither a file nor a directory", input.display());
    }

    let entries = std::fs::read_dir(input).with_context(|| format!("failed to list {}", input.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("failed to list {}", input.display()))?.path();
        let is_descriptor = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION));
        if is_descriptor && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Mesh path for one (input, isovalue) pair. Every isovalue of an input
/// shares the same OBJ document.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use isosurface_cli::output_path;
/// use mesh_export::MeshFormat;
///
/// let path = output_path(Path::new("out"), "storm", 0.5, MeshFormat::Stl);
/// assert_eq!(path, Path::new("out/storm_0.5.stl"));
///
/// let path = output_path(Path::new("out"), "storm", 0.5, MeshFormat::Obj);
/// assert_eq!(path, Path::new("out/storm.obj"));
/// ```
pub fn output_path(output_dir: &Path, stem: &str, isovalue: f32, format: MeshFormat) -> PathBuf {
    match format {
        MeshFormat::Obj => output_dir.join(format!("{stem}.{}", format.extension())),
        MeshFormat::Stl => output_dir.join(format!("{stem}_{isovalue}.{}", format.extension())),
    }
}

fn create_obj(path: &Path) -> Result<ObjWriter<BufWriter<File>>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(ObjWriter::new(BufWriter::new(file)))
}

/// Extracts and writes every isovalue of one volume source.
pub fn process_source(
    source: &impl VolumeDataSource,
    stem: &str,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<Vec<OutputReport>> {
    let started = Instant::now();
    let data = source.read_volume().context("failed to read volume")?;
    let [nx, ny, nz] = data.size;
    info!("{stem}: read {nx}x{ny}x{nz} volume ({} ms)", started.elapsed().as_millis());

    let started = Instant::now();
    let mut grid = data.into_grid().context("failed to build grid")?;
    info!("{stem}: built grid of {} cubes ({} ms)", grid.cube_count(), started.elapsed().as_millis());
    if let Some((lo, hi)) = grid.value_range() {
        info!("{stem}: finite values span [{lo}, {hi}]");
    }

    let mut obj = match options.format {
        MeshFormat::Obj => {
            let path = output_path(output_dir, stem, 0.0, MeshFormat::Obj);
            Some((create_obj(&path)?, path))
        }
        MeshFormat::Stl => None,
    };

    let mut outputs = Vec::with_capacity(options.isovalues.len());
    for &isovalue in &options.isovalues {
        let started = Instant::now();
        let triangles = extract_isosurface(&mut grid, isovalue, &options.extraction);
        info!(
            "{stem}: extracted {} triangles at {isovalue} ({} ms)",
            triangles.len(),
            started.elapsed().as_millis()
        );

        let started = Instant::now();
        let path = match obj.as_mut() {
            Some((writer, path)) => {
                writer
                    .write_object(isovalue, &triangles)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(
                    "{stem}: appended object at {isovalue} to {} ({} ms)",
                    path.display(),
                    started.elapsed().as_millis()
                );
                path.clone()
            }
            None => {
                let path = output_path(output_dir, stem, isovalue, options.format);
                export_to_path(options.format, &path, isovalue, &triangles)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("{stem}: wrote {} ({} ms)", path.display(), started.elapsed().as_millis());
                path
            }
        };

        outputs.push(OutputReport {
            isovalue,
            path,
            triangles: triangles.len(),
        });
    }

    if let Some((writer, path)) = obj {
        let vertices = writer.vertices_written();
        writer.finish().with_context(|| format!("failed to write {}", path.display()))?;
        info!("{stem}: wrote {} ({vertices} vertices)", path.display());
    }

    Ok(outputs)
}

/// Processes one GrADS descriptor.
pub fn process_file(ctl_path: &Path, output_dir: &Path, options: &BatchOptions) -> Result<FileReport> {
    let stem = ctl_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("cannot derive an output name from {}", ctl_path.display()))?;

    let outputs = process_source(&GradsSource::new(ctl_path), stem, output_dir, options)?;
    Ok(FileReport {
        input: ctl_path.to_path_buf(),
        outputs,
    })
}

/// Runs a whole batch.
///
/// Errors are returned only for problems that stop the batch as a whole (no
/// inputs to list, output directory cannot be created); per-file failures are
/// recorded in the report.
pub fn run_batch(input: &Path, output_dir: &Path, options: &BatchOptions) -> Result<BatchReport> {
    let inputs = collect_inputs(input)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
    info!("processing {} descriptor(s) into {}", inputs.len(), output_dir.display());

    let mut report = BatchReport::default();
    for ctl_path in inputs {
        info!("processing {}", ctl_path.display());
        match process_file(&ctl_path, output_dir, options) {
            Ok(file) => report.processed.push(file),
            Err(err) => {
                error!("{}: {err:#}", ctl_path.display());
                report.failed.push((ctl_path, format!("{err:#}")));
            }
        }
    }

    info!(
        "batch finished: {} processed, {} failed",
        report.processed.len(),
        report.failed.len()
    );
    Ok(report)
}
