//! Module for opening Imaris containers and retrieving planes and stacks.
//!
//! [`ImarisReader`] owns the open backing store, scans its hierarchy once on
//! construction, and then serves `read` requests for single (Y, X) planes or
//! whole (Z, Y, X) stacks. Structural defects of the container are fatal at
//! construction time; defects in the descriptive metadata (voxel extents,
//! timestamps, channel optics) never are, and degrade to documented
//! defaults with a logged warning instead.
//!
//! The store handle is released when the reader is dropped. Volumes built
//! over a reader borrow it, so the borrow checker keeps them from outliving
//! the open handle.
//!
//! [`ImarisReader`]: ./struct.ImarisReader.html

use crate::attribute::AttrValue;
use crate::element::{Element, ElementType};
use crate::error::{ImarisError, Result};
use crate::scan::{scan_structure, tagged_children, DATASET_ROOT};
use crate::store::{Hdf5Store, HierarchicalStore};
use crate::volume::LazyImarisVolume;
use chrono::NaiveDateTime;
use log::warn;
use ndarray::ArrayD;
use std::fmt;
use std::path::Path;

/// Group holding the descriptive metadata of the container.
const INFO_ROOT: &str = "DataSetInfo";

/// Timestamp layouts observed in the wild, with and without fractional
/// seconds.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Optical metadata for one acquisition channel.
///
/// Built once during the container scan and immutable afterwards. The
/// wavelength and exposure fields keep whatever the container holds: a
/// number when the attribute parses, the original text when it carries a
/// unit suffix such as `"600 nm"`, or absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    /// Channel index within the container.
    pub id: usize,
    /// Display name, `"Channel {id}"` if the container names none.
    pub name: String,
    /// Emission wavelength.
    pub emission_wavelength: AttrValue,
    /// Excitation wavelength.
    pub excitation_wavelength: AttrValue,
    /// Exposure time.
    pub exposure_time: AttrValue,
}

/// A reader for an Imaris 5D image container.
///
/// # Example
///
/// ```no_run
/// use imaris::ImarisReader;
/// # use imaris::Result;
///
/// # fn run() -> Result<()> {
/// let reader = ImarisReader::from_file("cells.ims")?;
/// let [_t, _c, z, _y, _x] = reader.shape();
/// let plane: ndarray::ArrayD<u16> = reader.read(0, 0, Some(z / 2), 0)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ImarisReader<S = Hdf5Store> {
    store: S,
    resolution_levels: Vec<String>,
    n_timepoints: usize,
    n_channels: usize,
    size_x: usize,
    size_y: usize,
    size_z: usize,
    dtype: ElementType,
    voxel_size: (f64, f64, f64),
    timestamps: Vec<Option<NaiveDateTime>>,
    channels: Vec<ChannelInfo>,
}

impl ImarisReader<Hdf5Store> {
    /// Open the Imaris container file at the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_store(Hdf5Store::open(path)?)
    }
}

impl<S> ImarisReader<S>
where
    S: HierarchicalStore,
{
    /// Build a reader over an already opened backing store.
    ///
    /// The store's hierarchy is scanned to determine the resolution level,
    /// timepoint and channel counts, the pixel type, and the volume shape;
    /// descriptive metadata is parsed with best effort afterwards.
    pub fn from_store(store: S) -> Result<Self> {
        let layout = scan_structure(&store)?;
        let level0 = format!("{}/{}", DATASET_ROOT, layout.resolution_levels[0]);
        let time0 = tagged_children(&store, &level0, "TimePoint")?
            .into_iter()
            .next()
            .ok_or(ImarisError::NoTimePoints)?;
        let time0 = format!("{}/{}", level0, time0);
        let channel0 = tagged_children(&store, &time0, "Channel")?
            .into_iter()
            .next()
            .ok_or(ImarisError::NoChannels)?;
        let data0 = format!("{}/{}/Data", time0, channel0);

        let dtype = store.dataset_type(&data0)?;
        let (size_z, size_y, size_x) = infer_sizes(&store, &data0)?;

        let mut reader = ImarisReader {
            store,
            resolution_levels: layout.resolution_levels,
            n_timepoints: layout.timepoints,
            n_channels: layout.channels,
            size_x,
            size_y,
            size_z,
            dtype,
            voxel_size: (1.0, 1.0, 1.0),
            timestamps: Vec::new(),
            channels: Vec::new(),
        };
        reader.voxel_size = reader.derive_voxel_size();
        reader.timestamps = reader.read_timestamps();
        reader.channels = reader.read_channels();
        Ok(reader)
    }

    /// Number of resolution levels stored side-by-side in the container.
    pub fn resolution_levels(&self) -> usize {
        self.resolution_levels.len()
    }

    /// Number of timepoints.
    pub fn n_timepoints(&self) -> usize {
        self.n_timepoints
    }

    /// Number of channels.
    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    /// Dimensions at full resolution, in the reader's native
    /// (T, C, Z, Y, X) order.
    pub fn shape(&self) -> [usize; 5] {
        [
            self.n_timepoints,
            self.n_channels,
            self.size_z,
            self.size_y,
            self.size_x,
        ]
    }

    /// The pixel element type stored in the container.
    pub fn dtype(&self) -> ElementType {
        self.dtype
    }

    /// Voxel size in physical units per pixel, as (Z, Y, X).
    ///
    /// Any axis whose extents are missing, malformed, or inconsistent
    /// reports 1.0.
    pub fn voxel_size(&self) -> (f64, f64, f64) {
        self.voxel_size
    }

    /// Acquisition timestamp per timepoint; `None` where the container
    /// holds none or it fails to parse.
    pub fn timestamps(&self) -> &[Option<NaiveDateTime>] {
        &self.timestamps
    }

    /// Channel descriptors, one per channel.
    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    /// Build a lazy canonical 5D volume over this reader.
    pub fn volume(&self) -> LazyImarisVolume<'_, S> {
        LazyImarisVolume::new(self)
    }

    /// Read image data for one channel and timepoint.
    ///
    /// With `z` given, returns a single (Y, X) plane; with `z` of `None`,
    /// returns the full (Z, Y, X) stack in a single request.
    ///
    /// # Errors
    ///
    /// - `ResolutionLevelOutOfRange` if `level` is past the number of
    ///   levels discovered on scan.
    /// - `TimePointNotFound`/`ChannelNotFound` if no group for the index
    ///   exists under either naming convention.
    pub fn read<T: Element>(
        &self,
        channel: usize,
        time: usize,
        z: Option<usize>,
        level: usize,
    ) -> Result<ArrayD<T>> {
        if level >= self.resolution_levels.len() {
            return Err(ImarisError::ResolutionLevelOutOfRange(
                level,
                self.resolution_levels.len(),
            ));
        }
        let level_path = format!("{}/{}", DATASET_ROOT, self.resolution_levels[level]);
        let time_name = self
            .find_child(&level_path, "TimePoint", time)?
            .ok_or(ImarisError::TimePointNotFound(time))?;
        let time_path = format!("{}/{}", level_path, time_name);
        let channel_name = self
            .find_child(&time_path, "Channel", channel)?
            .ok_or(ImarisError::ChannelNotFound(channel))?;
        let data_path = format!("{}/{}/Data", time_path, channel_name);

        match z {
            Some(z) => Ok(self.store.read_plane::<T>(&data_path, z)?.into_dyn()),
            None => Ok(self.store.read_stack::<T>(&data_path)?.into_dyn()),
        }
    }

    /// Locate a child group by index, accepting both the `"Tag N"` and the
    /// `"TagN"` naming convention.
    fn find_child(&self, path: &str, tag: &str, index: usize) -> Result<Option<String>> {
        let spaced = format!("{} {}", tag, index);
        let plain = format!("{}{}", tag, index);
        Ok(self
            .store
            .list_children(path)?
            .into_iter()
            .find(|name| *name == spaced || *name == plain))
    }

    fn attr(&self, path: &str, name: &str, cast: fn(Option<&crate::attribute::RawAttr>) -> AttrValue) -> AttrValue {
        match self.store.read_attr(path, name) {
            Ok(raw) => cast(raw.as_ref()),
            Err(e) => {
                warn!("failed to read attribute {}@{}: {}", name, path, e);
                AttrValue::Absent
            }
        }
    }

    fn derive_voxel_size(&self) -> (f64, f64, f64) {
        let image = format!("{}/Image", INFO_ROOT);
        let axis_scale = |axis: usize, size: usize| -> f64 {
            let min = self.attr(&image, &format!("ExtMin{}", axis), AttrValue::float);
            let max = self.attr(&image, &format!("ExtMax{}", axis), AttrValue::float);
            match (min.as_f64(), max.as_f64()) {
                (Some(min), Some(max)) if size > 0 => {
                    let scale = (max - min) / size as f64;
                    if scale > 0.0 {
                        scale
                    } else {
                        warn!("non-positive extent span on axis {}, using 1.0", axis);
                        1.0
                    }
                }
                _ => 1.0,
            }
        };
        // Ext attributes are numbered X, Y, Z; the reported tuple is (Z, Y, X)
        (
            axis_scale(2, self.size_z),
            axis_scale(1, self.size_y),
            axis_scale(0, self.size_x),
        )
    }

    fn read_timestamps(&self) -> Vec<Option<NaiveDateTime>> {
        let time_info = format!("{}/TimeInfo", INFO_ROOT);
        (0..self.n_timepoints)
            .map(|i| {
                // timestamp attributes are 1-based, unlike the data groups
                let keys = [
                    format!("TimePoint{}", i + 1),
                    format!("TimePoint {}", i + 1),
                ];
                let text = keys
                    .iter()
                    .find_map(|k| self.attr(&time_info, k, AttrValue::text).as_str().map(str::to_owned));
                match text {
                    Some(text) => {
                        let parsed = TIMESTAMP_FORMATS
                            .iter()
                            .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok());
                        if parsed.is_none() {
                            warn!("unparsable timestamp for timepoint {}: {:?}", i, text);
                        }
                        parsed
                    }
                    None => None,
                }
            })
            .collect()
    }

    fn read_channels(&self) -> Vec<ChannelInfo> {
        (0..self.n_channels)
            .map(|i| {
                let path = format!("{}/Channel {}", INFO_ROOT, i);
                let name = match self.attr(&path, "Name", AttrValue::text) {
                    AttrValue::Text(name) => name,
                    _ => format!("Channel {}", i),
                };
                // the instrument-specific attribute wins when present
                let emission = self.preferred_float(&path, "LSMEmissionWavelength", "EmissionWavelength");
                let excitation =
                    self.preferred_float(&path, "LSMExcitationWavelength", "ExcitationWavelength");
                let exposure = self.attr(&path, "ExposureTime", AttrValue::float);
                ChannelInfo {
                    id: i,
                    name,
                    emission_wavelength: emission,
                    excitation_wavelength: excitation,
                    exposure_time: exposure,
                }
            })
            .collect()
    }

    fn preferred_float(&self, path: &str, primary: &str, fallback: &str) -> AttrValue {
        let value = self.attr(path, primary, AttrValue::float);
        if value.is_absent() {
            self.attr(path, fallback, AttrValue::float)
        } else {
            value
        }
    }
}

/// Infer the (Z, Y, X) sizes from the `ImageSize*` attributes of the
/// reference dataset, falling back to the on-disk dataset shape when any of
/// them is missing or not numeric.
fn infer_sizes<S: HierarchicalStore>(store: &S, data_path: &str) -> Result<(usize, usize, usize)> {
    let size_of = |name: &str| -> Option<usize> {
        match store.read_attr(data_path, name) {
            Ok(raw) => AttrValue::int(raw.as_ref()).as_usize(),
            Err(e) => {
                warn!("failed to read attribute {}@{}: {}", name, data_path, e);
                None
            }
        }
    };
    let sizes = (size_of("ImageSizeZ"), size_of("ImageSizeY"), size_of("ImageSizeX"));
    if let (Some(z), Some(y), Some(x)) = sizes {
        return Ok((z, y, x));
    }

    let shape = store.dataset_shape(data_path)?;
    match shape.len() {
        3 => Ok((shape[0], shape[1], shape[2])),
        2 => Ok((1, shape[0], shape[1])),
        rank if rank > 3 => Ok((shape[rank - 3], shape[rank - 2], shape[rank - 1])),
        rank => Err(ImarisError::IncorrectRank(rank)),
    }
}

impl<S> fmt::Display for ImarisReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Imaris container: shape (T, C, Z, Y, X) = ({}, {}, {}, {}, {})",
            self.n_timepoints, self.n_channels, self.size_z, self.size_y, self.size_x
        )?;
        writeln!(f, "  dtype: {}", self.dtype)?;
        let (z, y, x) = self.voxel_size;
        writeln!(f, "  voxel size (Z, Y, X): ({}, {}, {})", z, y, x)?;
        let names: Vec<&str> = self.channels.iter().map(|c| c.name.as_str()).collect();
        write!(f, "  channels: {:?}", names)
    }
}
