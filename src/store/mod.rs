//! Abstraction over the hierarchical backing container.
//!
//! A [`HierarchicalStore`] is the narrow interface the reader needs from a
//! container: enumerate child nodes, read raw attributes, and read pixel
//! data either one plane at a time or as a whole stack in one request. The
//! disk implementation ([`Hdf5Store`]) owns the open file handle and closes
//! it on drop; [`MemStore`] holds a synthetic container in memory and backs
//! most of the test suite.
//!
//! [`HierarchicalStore`]: ./trait.HierarchicalStore.html
//! [`Hdf5Store`]: ./hdf5/struct.Hdf5Store.html
//! [`MemStore`]: ./mem/struct.MemStore.html

pub mod hdf5;
pub mod mem;

pub use self::hdf5::Hdf5Store;
pub use self::mem::MemStore;

use crate::attribute::RawAttr;
use crate::element::{Element, ElementType};
use crate::error::Result;
use ndarray::{Array2, Array3};

/// Interface to a hierarchical container of groups, attributes and datasets.
///
/// Paths are slash separated and relative to the container root, e.g.
/// `"DataSet/ResolutionLevel 0/TimePoint 0/Channel 0/Data"`.
pub trait HierarchicalStore {
    /// List the names of the child nodes of the group at `path`.
    fn list_children(&self, path: &str) -> Result<Vec<String>>;

    /// Read the raw attribute `name` of the node at `path`.
    ///
    /// A missing node or a missing attribute yields `Ok(None)`; only an
    /// actual read failure is an error.
    fn read_attr(&self, path: &str, name: &str) -> Result<Option<RawAttr>>;

    /// Element type of the dataset at `path`.
    fn dataset_type(&self, path: &str) -> Result<ElementType>;

    /// Shape of the dataset at `path`, as stored on disk.
    fn dataset_shape(&self, path: &str) -> Result<Vec<usize>>;

    /// Read one (Y, X) plane of the dataset at `path`.
    ///
    /// Datasets of rank 2 hold a single plane at `z = 0`.
    fn read_plane<T: Element>(&self, path: &str, z: usize) -> Result<Array2<T>>;

    /// Read the whole dataset at `path` as a (Z, Y, X) stack, in one request.
    ///
    /// This is the bulk read the lazy volume relies on when a full Z range
    /// is selected; implementations must not degrade it to per-plane reads.
    fn read_stack<T: Element>(&self, path: &str) -> Result<Array3<T>>;
}
