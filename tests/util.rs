//! Shared fixtures: a synthetic container exercising the Imaris layout,
//! and a store wrapper counting pixel data requests.

use imaris::{Element, ElementType, HierarchicalStore, MemStore, RawAttr, Result};
use ndarray::{Array2, Array3, ArrayD, IxDyn};
use std::cell::Cell;
use std::rc::Rc;

/// Timepoints in the sample container.
pub const N_T: usize = 2;
/// Channels in the sample container.
pub const N_C: usize = 2;
/// Planes per stack in the sample container.
pub const N_Z: usize = 3;
/// Rows per plane in the sample container.
pub const N_Y: usize = 4;
/// Columns per plane in the sample container.
pub const N_X: usize = 5;

/// A distinct value per coordinate, readable off its digits.
pub fn pixel(t: usize, z: usize, c: usize, y: usize, x: usize) -> f64 {
    (t * 100000 + z * 10000 + c * 1000 + y * 10 + x) as f64
}

fn char_array(text: &str) -> RawAttr {
    RawAttr::StrArray(text.chars().map(|c| c.to_string()).collect())
}

/// Build a two-timepoint, two-channel, two-resolution-level container.
///
/// Level 0 uses the spaced group naming (`"TimePoint 0"`), level 1 the
/// compact one (`"TimePoint0"`), mirroring the mix seen in real files.
/// Image sizes are stored in the character-array attribute encoding.
pub fn sample_store() -> MemStore {
    let mut store = MemStore::new();

    for t in 0..N_T {
        for c in 0..N_C {
            let path = format!(
                "DataSet/ResolutionLevel 0/TimePoint {}/Channel {}/Data",
                t, c
            );
            let values = Array3::from_shape_fn((N_Z, N_Y, N_X), |(z, y, x)| pixel(t, z, c, y, x));
            store.add_dataset(&path, ElementType::UInt32, values.into_dyn());
            store.set_attr(&path, "ImageSizeX", char_array(&N_X.to_string()));
            store.set_attr(&path, "ImageSizeY", char_array(&N_Y.to_string()));
            store.set_attr(&path, "ImageSizeZ", char_array(&N_Z.to_string()));
        }
    }

    // a downsampled copy under the compact naming convention
    let level1 = "DataSet/ResolutionLevel 1/TimePoint0/Channel0/Data";
    store.add_dataset(
        level1,
        ElementType::UInt32,
        ArrayD::zeros(IxDyn(&[1, 2, 2])),
    );

    let image = "DataSetInfo/Image";
    store.set_attr(image, "ExtMin0", char_array("0"));
    store.set_attr(image, "ExtMax0", char_array("5"));
    store.set_attr(image, "ExtMin1", RawAttr::Float(0.0));
    store.set_attr(image, "ExtMax1", RawAttr::Float(8.0));
    store.set_attr(image, "ExtMin2", RawAttr::Float(0.0));
    // unit suffix: this axis degrades to the identity scale
    store.set_attr(image, "ExtMax2", RawAttr::Str("10 um".to_owned()));

    let time_info = "DataSetInfo/TimeInfo";
    store.set_attr(
        time_info,
        "TimePoint1",
        RawAttr::Str("2021-03-04 10:00:00.250".to_owned()),
    );
    store.set_attr(
        time_info,
        "TimePoint 2",
        RawAttr::Str("2021-03-04 10:00:05".to_owned()),
    );

    store.set_attr("DataSetInfo/Channel 0", "Name", char_array("DAPI"));
    store.set_attr(
        "DataSetInfo/Channel 0",
        "LSMEmissionWavelength",
        char_array("461"),
    );
    store.set_attr(
        "DataSetInfo/Channel 1",
        "EmissionWavelength",
        RawAttr::Str("600 nm".to_owned()),
    );
    store.set_attr("DataSetInfo/Channel 1", "ExposureTime", RawAttr::Float(0.01));

    store
}

/// The sample container's data in canonical (T, Z, C, Y, X) order.
pub fn canonical_data() -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(&[N_T, N_Z, N_C, N_Y, N_X]), |ix| {
        pixel(ix[0], ix[1], ix[2], ix[3], ix[4])
    })
}

/// Counters shared with a [`CountingStore`], kept alive by the test while
/// the store itself moves into the reader.
#[derive(Debug, Clone, Default)]
pub struct ReadCounts {
    pub planes: Rc<Cell<usize>>,
    pub stacks: Rc<Cell<usize>>,
}

impl ReadCounts {
    pub fn reset(&self) {
        self.planes.set(0);
        self.stacks.set(0);
    }
}

/// A store wrapper counting how pixel data is requested.
#[derive(Debug)]
pub struct CountingStore {
    inner: MemStore,
    counts: ReadCounts,
}

impl CountingStore {
    pub fn new(inner: MemStore) -> (Self, ReadCounts) {
        let counts = ReadCounts::default();
        let store = CountingStore {
            inner,
            counts: counts.clone(),
        };
        (store, counts)
    }
}

impl HierarchicalStore for CountingStore {
    fn list_children(&self, path: &str) -> Result<Vec<String>> {
        self.inner.list_children(path)
    }

    fn read_attr(&self, path: &str, name: &str) -> Result<Option<RawAttr>> {
        self.inner.read_attr(path, name)
    }

    fn dataset_type(&self, path: &str) -> Result<ElementType> {
        self.inner.dataset_type(path)
    }

    fn dataset_shape(&self, path: &str) -> Result<Vec<usize>> {
        self.inner.dataset_shape(path)
    }

    fn read_plane<T: Element>(&self, path: &str, z: usize) -> Result<Array2<T>> {
        self.counts.planes.set(self.counts.planes.get() + 1);
        self.inner.read_plane(path, z)
    }

    fn read_stack<T: Element>(&self, path: &str) -> Result<Array3<T>> {
        self.counts.stacks.set(self.counts.stacks.get() + 1);
        self.inner.read_stack(path)
    }
}
