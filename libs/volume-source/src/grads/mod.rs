//! # GrADS Reader
//!
//! Reads a GrADS data descriptor (`.ctl`) and the first variable at the first
//! time step of its flat binary data file.
//!
//! ## Supported entries
//!
//! | Entry        | Handling                                              |
//! |--------------|-------------------------------------------------------|
//! | `DSET`       | data path, `^` is relative to the descriptor           |
//! | `TITLE`      | recorded                                              |
//! | `UNDEF`      | recorded, values are passed through unchanged          |
//! | `OPTIONS`    | `big_endian`, `little_endian`, `byteswapped`           |
//! | `FILEHEADER` | bytes skipped before the data                         |
//! | `XDEF` etc.  | `LINEAR start step`, or evenly spaced `LEVELS`         |
//! | `TDEF`       | count recorded, calendar ignored                      |
//! | `VARS`       | variable list up to `ENDVARS`                         |
//!
//! Lines starting with `*` are comments. Keywords are case-insensitive.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::{VolumeData, VolumeDataSource};

const FLOAT_LEN: usize = 4;

/// Byte order of the binary data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl ByteOrder {
    /// Byte order of the running machine.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    fn swapped(self) -> Self {
        match self {
            ByteOrder::Little => ByteOrder::Big,
            ByteOrder::Big => ByteOrder::Little,
        }
    }

    fn decode(self, raw: [u8; FLOAT_LEN]) -> f32 {
        match self {
            ByteOrder::Little => f32::from_le_bytes(raw),
            ByteOrder::Big => f32::from_be_bytes(raw),
        }
    }
}

/// A uniformly spaced axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDef {
    /// Number of grid points
    pub count: usize,
    /// Coordinate of the first point
    pub start: f32,
    /// Spacing between points
    pub step: f32,
}

/// One entry of the `VARS` block.
#[derive(Debug, Clone, PartialEq)]
pub struct GradsVariable {
    /// Variable name
    pub name: String,
    /// Vertical levels; 0 means a single surface level
    pub levels: usize,
    /// Free text after the units field
    pub description: String,
}

/// A parsed `.ctl` descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct GradsDescriptor {
    /// Resolved data file path
    pub dset: PathBuf,
    /// `TITLE` text
    pub title: Option<String>,
    /// `UNDEF` marker value
    pub undef: Option<f32>,
    /// Data byte order
    pub byte_order: ByteOrder,
    /// Bytes to skip at the start of the data file
    pub file_header: usize,
    /// `XDEF`
    pub x: AxisDef,
    /// `YDEF`
    pub y: AxisDef,
    /// `ZDEF`
    pub z: AxisDef,
    /// `TDEF` count, 1 when absent
    pub time_steps: usize,
    /// Variables in file order
    pub variables: Vec<GradsVariable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn keyword(self) -> &'static str {
        match self {
            Axis::X => "XDEF",
            Axis::Y => "YDEF",
            Axis::Z => "ZDEF",
        }
    }
}

/// `LEVELS` values may continue on the following lines.
struct PendingLevels {
    axis: Axis,
    count: usize,
    values: Vec<f32>,
    line: usize,
}

#[derive(Default)]
struct DescriptorBuilder {
    dset: Option<PathBuf>,
    title: Option<String>,
    undef: Option<f32>,
    byte_order: Option<ByteOrder>,
    file_header: usize,
    axes: [Option<AxisDef>; 3],
    time_steps: Option<usize>,
    declared_vars: Option<(usize, usize)>,
    variables: Vec<(GradsVariable, usize)>,
    vars_closed: bool,
    pending: Option<PendingLevels>,
}

fn parse_number<T: std::str::FromStr>(token: Option<&str>, line: usize, what: &str) -> SourceResult<T> {
    let token = token.ok_or_else(|| SourceError::parse(line, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| SourceError::parse(line, format!("invalid {what}: {token}")))
}

fn uniform_levels(axis: Axis, values: &[f32], line: usize) -> SourceResult<AxisDef> {
    let first = values[0];
    if values.len() == 1 {
        return Ok(AxisDef {
            count: 1,
            start: first,
            step: 1.0,
        });
    }

    let last = values[values.len() - 1];
    let step = (last - first) / (values.len() - 1) as f32;
    let tolerance = step.abs() * 1e-3;
    let uneven = values
        .iter()
        .enumerate()
        .any(|(i, &v)| (v - (first + step * i as f32)).abs() > tolerance);
    if uneven || step == 0.0 {
        return Err(SourceError::Unsupported(format!(
            "{} LEVELS at line {line} are not evenly spaced",
            axis.keyword()
        )));
    }

    Ok(AxisDef {
        count: values.len(),
        start: first,
        step,
    })
}

impl DescriptorBuilder {
    fn set_axis(&mut self, axis: Axis, def: AxisDef) {
        self.axes[axis as usize] = Some(def);
    }

    fn finish_levels(&mut self) -> SourceResult<()> {
        if let Some(pending) = self.pending.take() {
            if pending.values.len() < pending.count {
                return Err(SourceError::parse(
                    pending.line,
                    format!(
                        "{} LEVELS lists {} of {} values",
                        pending.axis.keyword(),
                        pending.values.len(),
                        pending.count
                    ),
                ));
            }
            let def = uniform_levels(pending.axis, &pending.values[..pending.count], pending.line)?;
            self.set_axis(pending.axis, def);
        }
        Ok(())
    }

    fn in_vars_block(&self) -> bool {
        self.declared_vars.is_some() && !self.vars_closed
    }

    fn line(&mut self, raw: &str, line: usize, base_dir: &Path) -> SourceResult<()> {
        let text = raw.trim();
        if text.is_empty() || text.starts_with('*') {
            return Ok(());
        }

        if let Some(pending) = self.pending.as_mut() {
            let continuation: Option<Vec<f32>> = text.split_whitespace().map(|t| t.parse().ok()).collect();
            if let Some(values) = continuation {
                pending.values.extend(values);
                return Ok(());
            }
        }
        self.finish_levels()?;

        let (keyword, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let rest = rest.trim();
        let keyword = keyword.to_ascii_lowercase();

        if self.in_vars_block() && keyword != "endvars" {
            return self.variable(rest, text, line);
        }

        let mut tokens = rest.split_whitespace();
        match keyword.as_str() {
            "dset" => {
                if rest.is_empty() {
                    return Err(SourceError::parse(line, "DSET without a path"));
                }
                self.dset = Some(match rest.strip_prefix('^') {
                    Some(relative) => base_dir.join(relative),
                    None => PathBuf::from(rest),
                });
            }
            "title" => self.title = Some(rest.to_string()),
            "undef" => self.undef = Some(parse_number(tokens.next(), line, "UNDEF value")?),
            "options" => {
                for option in tokens {
                    let order = match option.to_ascii_lowercase().as_str() {
                        "big_endian" => ByteOrder::Big,
                        "little_endian" => ByteOrder::Little,
                        "byteswapped" => ByteOrder::native().swapped(),
                        other => return Err(SourceError::Unsupported(format!("OPTIONS {other}"))),
                    };
                    self.byte_order = Some(order);
                }
            }
            "fileheader" => self.file_header = parse_number(tokens.next(), line, "FILEHEADER size")?,
            "xdef" => self.axis(Axis::X, tokens, line)?,
            "ydef" => self.axis(Axis::Y, tokens, line)?,
            "zdef" => self.axis(Axis::Z, tokens, line)?,
            "tdef" => self.time_steps = Some(parse_number(tokens.next(), line, "TDEF count")?),
            "vars" => {
                if self.declared_vars.is_some() {
                    return Err(SourceError::parse(line, "second VARS block"));
                }
                let count: usize = parse_number(tokens.next(), line, "VARS count")?;
                self.declared_vars = Some((count, line));
            }
            "endvars" => {
                let Some((declared, _)) = self.declared_vars.filter(|_| !self.vars_closed) else {
                    return Err(SourceError::parse(line, "ENDVARS without VARS"));
                };
                if declared != self.variables.len() {
                    return Err(SourceError::parse(
                        line,
                        format!("VARS declares {declared} variables, found {}", self.variables.len()),
                    ));
                }
                self.vars_closed = true;
            }
            "pdef" | "dtype" => {
                return Err(SourceError::Unsupported(keyword.to_ascii_uppercase()));
            }
            other => warn!("ignoring descriptor entry {other} at line {line}"),
        }
        Ok(())
    }

    fn axis<'a>(&mut self, axis: Axis, mut tokens: impl Iterator<Item = &'a str>, line: usize) -> SourceResult<()> {
        let count: usize = parse_number(tokens.next(), line, "point count")?;
        if count == 0 {
            return Err(SourceError::parse(line, format!("{} with zero points", axis.keyword())));
        }

        let mapping = tokens.next().map(str::to_ascii_lowercase);
        match mapping.as_deref() {
            Some("linear") => {
                let start = parse_number(tokens.next(), line, "start")?;
                let step: f32 = parse_number(tokens.next(), line, "step")?;
                if count > 1 && (step == 0.0 || !step.is_finite()) {
                    return Err(SourceError::parse(
                        line,
                        format!("{} step {step} is not a finite non-zero spacing", axis.keyword()),
                    ));
                }
                self.set_axis(axis, AxisDef { count, start, step });
            }
            Some("levels") => {
                let values = tokens
                    .map(|t| parse_number(Some(t), line, "level"))
                    .collect::<SourceResult<Vec<f32>>>()?;
                self.pending = Some(PendingLevels {
                    axis,
                    count,
                    values,
                    line,
                });
            }
            Some(other) => {
                return Err(SourceError::Unsupported(format!("{} mapping {other}", axis.keyword())));
            }
            None => return Err(SourceError::parse(line, format!("{} without a mapping", axis.keyword()))),
        }
        Ok(())
    }

    fn variable(&mut self, rest: &str, text: &str, line: usize) -> SourceResult<()> {
        let mut tokens = text.split_whitespace();
        let name = tokens.next().unwrap_or_default().to_string();
        let levels = parse_number(tokens.next(), line, "variable level count")?;
        if tokens.next().is_none() {
            return Err(SourceError::parse(line, format!("variable {name} has no units field")));
        }
        let description = rest.split_whitespace().skip(2).collect::<Vec<_>>().join(" ");
        self.variables.push((
            GradsVariable {
                name,
                levels,
                description,
            },
            line,
        ));
        Ok(())
    }

    fn build(mut self) -> SourceResult<GradsDescriptor> {
        self.finish_levels()?;

        if let Some((_, line)) = self.declared_vars.filter(|_| !self.vars_closed) {
            return Err(SourceError::parse(line, "VARS block is not closed by ENDVARS"));
        }

        let dset = self.dset.ok_or(SourceError::MissingField("DSET"))?;
        let [x, y, z] = self.axes;
        let x = x.ok_or(SourceError::MissingField("XDEF"))?;
        let y = y.ok_or(SourceError::MissingField("YDEF"))?;
        let z = z.ok_or(SourceError::MissingField("ZDEF"))?;

        let Some((first, line)) = self.variables.first() else {
            return Err(SourceError::MissingField("VARS"));
        };
        if first.levels > z.count {
            return Err(SourceError::parse(
                *line,
                format!("variable {} has {} levels but ZDEF has {}", first.name, first.levels, z.count),
            ));
        }

        Ok(GradsDescriptor {
            dset,
            title: self.title,
            undef: self.undef,
            byte_order: self.byte_order.unwrap_or_else(ByteOrder::native),
            file_header: self.file_header,
            x,
            y,
            z,
            time_steps: self.time_steps.unwrap_or(1),
            variables: self.variables.into_iter().map(|(var, _)| var).collect(),
        })
    }
}

/// A single-point axis has no spacing; substitute 1 so the grid accepts it.
fn usable_step(count: usize, step: f32) -> f32 {
    if count <= 1 && (step == 0.0 || !step.is_finite()) {
        1.0
    } else {
        step
    }
}

impl GradsDescriptor {
    /// Parses descriptor text; `^` paths are resolved against `base_dir`.
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    /// use volume_source::GradsDescriptor;
    ///
    /// let ctl = "DSET ^field.bin\n\
    ///            XDEF 4 LINEAR 0 1\n\
    ///            YDEF 3 LINEAR 0 1\n\
    ///            ZDEF 2 LEVELS 1000 900\n\
    ///            VARS 1\n\
    ///            t 2 99 temperature\n\
    ///            ENDVARS\n";
    /// let desc = GradsDescriptor::parse(ctl, Path::new("/data")).unwrap();
    /// assert_eq!(desc.dset, Path::new("/data/field.bin"));
    /// assert_eq!(desc.grid_size(), [4, 3, 2]);
    /// assert_eq!(desc.z.step, -100.0);
    /// ```
    pub fn parse(text: &str, base_dir: &Path) -> SourceResult<Self> {
        let mut builder = DescriptorBuilder::default();
        for (index, raw) in text.lines().enumerate() {
            builder.line(raw, index + 1, base_dir)?;
        }
        builder.build()
    }

    /// Reads and parses a descriptor file.
    pub fn from_path(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&text, base_dir)
    }

    /// Vertical levels stored for the first variable.
    pub fn levels(&self) -> usize {
        self.variables.first().map_or(1, |var| var.levels.max(1))
    }

    /// Grid size of the volume that [`read_values`](Self::read_values) returns.
    pub fn grid_size(&self) -> [usize; 3] {
        [self.x.count, self.y.count, self.levels()]
    }

    /// Reads the first variable at the first time step.
    ///
    /// # Errors
    ///
    /// `Io` when the data file cannot be read, `Truncated` when it holds
    /// fewer values than the grid needs, `Unsupported` when the grid and
    /// header sizes overflow.
    pub fn read_values(&self) -> SourceResult<Vec<f32>> {
        let [nx, ny, nz] = self.grid_size();
        let expected = nx
            .checked_mul(ny)
            .and_then(|n| n.checked_mul(nz))
            .and_then(|n| n.checked_mul(FLOAT_LEN))
            .ok_or_else(|| SourceError::Unsupported(format!("grid {nx}x{ny}x{nz} is too large")))?;
        let total = expected
            .checked_add(self.file_header)
            .ok_or_else(|| SourceError::Unsupported(format!("file header of {} bytes is too large", self.file_header)))?;

        let io_err = |source| SourceError::Io {
            path: self.dset.clone(),
            source,
        };
        let file = File::open(&self.dset).map_err(io_err)?;
        let file_len = file.metadata().map_err(io_err)?.len();
        if file_len < total as u64 {
            let actual = usize::try_from(file_len)
                .unwrap_or(usize::MAX)
                .saturating_sub(self.file_header);
            return Err(SourceError::Truncated { expected, actual });
        }

        let mut bytes = Vec::with_capacity(total);
        file.take(total as u64).read_to_end(&mut bytes).map_err(io_err)?;

        let actual = bytes.len().saturating_sub(self.file_header);
        if actual < expected {
            return Err(SourceError::Truncated { expected, actual });
        }

        let values = bytes[self.file_header..]
            .chunks_exact(FLOAT_LEN)
            .map(|chunk| {
                let mut raw = [0u8; FLOAT_LEN];
                raw.copy_from_slice(chunk);
                self.byte_order.decode(raw)
            })
            .collect();
        Ok(values)
    }

    /// Reads the data file into a volume snapshot.
    pub fn read_volume(&self) -> SourceResult<VolumeData> {
        let values = self.read_values()?;
        let size = self.grid_size();
        Ok(VolumeData {
            size,
            step: [
                usable_step(size[0], self.x.step),
                usable_step(size[1], self.y.step),
                usable_step(size[2], self.z.step),
            ],
            start: [self.x.start, self.y.start, self.z.start],
            values,
        })
    }
}

/// A volume stored as a GrADS descriptor plus binary data file.
#[derive(Debug, Clone)]
pub struct GradsSource {
    ctl_path: PathBuf,
}

impl GradsSource {
    /// Source for the descriptor at `ctl_path`; nothing is read yet.
    pub fn new(ctl_path: impl Into<PathBuf>) -> Self {
        Self {
            ctl_path: ctl_path.into(),
        }
    }

    /// Descriptor path.
    pub fn path(&self) -> &Path {
        &self.ctl_path
    }

    /// Parses the descriptor.
    pub fn descriptor(&self) -> SourceResult<GradsDescriptor> {
        GradsDescriptor::from_path(&self.ctl_path)
    }
}

impl VolumeDataSource for GradsSource {
    fn read_volume(&self) -> SourceResult<VolumeData> {
        let descriptor = self.descriptor()?;
        let [nx, ny, nz] = descriptor.grid_size();
        debug!(
            "{}: {}x{}x{} {:?} floats from {}",
            self.ctl_path.display(),
            nx,
            ny,
            nz,
            descriptor.byte_order,
            descriptor.dset.display()
        );
        descriptor.read_volume()
    }
}
