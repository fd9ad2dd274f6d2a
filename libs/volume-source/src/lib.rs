//! Volume data sources.
//!
//! A [`VolumeDataSource`] yields one [`VolumeData`] snapshot: grid sizes,
//! spacing, origin and x-fastest scalar values. The isosurface engine never
//! reads files itself; it only consumes snapshots converted with
//! [`VolumeData::into_grid`].

pub mod error;
pub mod grads;

use isosurface::{GridDims, Vec3, VolumeGrid};

pub use error::{SourceError, SourceResult};
pub use grads::{ByteOrder, GradsDescriptor, GradsSource};

/// Anything that can produce a regular scalar volume.
pub trait VolumeDataSource {
    /// Reads the full volume.
    fn read_volume(&self) -> SourceResult<VolumeData>;
}

/// A regular scalar volume snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeData {
    /// Samples along x, y, z
    pub size: [usize; 3],
    /// Spacing along x, y, z
    pub step: [f32; 3],
    /// Position of the first sample
    pub start: [f32; 3],
    /// Scalar values, x fastest then y then z
    pub values: Vec<f32>,
}

impl VolumeData {
    /// Converts the snapshot into a grid ready for classification.
    ///
    /// # Examples
    /// ```
    /// use volume_source::VolumeData;
    ///
    /// let data = VolumeData {
    ///     size: [2, 2, 2],
    ///     step: [1.0; 3],
    ///     start: [0.0; 3],
    ///     values: vec![0.0; 8],
    /// };
    /// let grid = data.into_grid().unwrap();
    /// assert_eq!(grid.cube_count(), 1);
    /// ```
    pub fn into_grid(self) -> SourceResult<VolumeGrid> {
        let [size_x, size_y, size_z] = self.size;
        let grid = VolumeGrid::new(
            GridDims::new(size_x, size_y, size_z),
            Vec3::from_array(self.step),
            Vec3::from_array(self.start),
            self.values,
        )?;
        Ok(grid)
    }
}

/// A source backed by an in-memory snapshot.
///
/// # Examples
/// ```
/// use volume_source::{InMemorySource, VolumeData, VolumeDataSource};
///
/// let source = InMemorySource::new(VolumeData {
///     size: [3, 1, 1],
///     step: [0.5, 1.0, 1.0],
///     start: [0.0; 3],
///     values: vec![1.0, 2.0, 3.0],
/// });
/// assert_eq!(source.read_volume().unwrap().values.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct InMemorySource {
    data: VolumeData,
}

impl InMemorySource {
    /// Wraps a snapshot.
    pub fn new(data: VolumeData) -> Self {
        Self { data }
    }
}

impl VolumeDataSource for InMemorySource {
    fn read_volume(&self) -> SourceResult<VolumeData> {
        Ok(self.data.clone())
    }
}
