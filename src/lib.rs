//! Rust implementation of the Imaris (IMS) 5D image access layer.
//!
//! This crate reads the hierarchical, chunked image containers written by
//! Imaris and presents them, along with plain in-memory buffers, through
//! one canonical 5-dimensional (Time, Z, Channel, Y, X) indexing contract
//! that materializes no more data than a key asks for.
//!
//! The building blocks, bottom up:
//!
//! - [`attribute`] decodes the container's loosely typed attribute values,
//!   including the legacy character-array encoding of short text.
//! - [`scan`] discovers the resolution level / timepoint / channel
//!   hierarchy, ordering groups by the number embedded in their names.
//! - [`reader`] combines the two into [`ImarisReader`], which owns the
//!   open store and serves single planes or whole Z stacks.
//! - [`volume`] holds the canonical 5D proxies: lazy over a reader,
//!   direct over a memory buffer, axis-permuted views over either, and
//!   the normalizer that canonicalizes arbitrary-rank arrays.
//!
//! # Example
//!
//! ```
//! use imaris::{ElementType, ImarisReader, MemStore, Selector, Volume5d};
//! use ndarray::{ArrayD, IxDyn};
//!
//! // a synthetic container; `ImarisReader::from_file` opens a real one
//! let mut store = MemStore::new();
//! store.add_dataset(
//!     "DataSet/ResolutionLevel 0/TimePoint 0/Channel 0/Data",
//!     ElementType::UInt8,
//!     ArrayD::zeros(IxDyn(&[4, 8, 8])),
//! );
//! let reader = ImarisReader::from_store(store)?;
//! assert_eq!(reader.shape(), [1, 1, 4, 8, 8]);
//!
//! let volume = reader.volume();
//! let plane: ndarray::ArrayD<u8> = volume.index(&[Selector::from(0), Selector::from(2)])?;
//! assert_eq!(plane.shape(), &[1, 8, 8]);
//! # Ok::<(), imaris::ImarisError>(())
//! ```
//!
//! [`attribute`]: ./attribute/index.html
//! [`scan`]: ./scan/index.html
//! [`reader`]: ./reader/index.html
//! [`volume`]: ./volume/index.html
//! [`ImarisReader`]: ./reader/struct.ImarisReader.html
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts)]

pub mod attribute;
pub mod element;
pub mod error;
pub mod reader;
pub mod scan;
pub mod store;
pub mod volume;

pub use crate::attribute::{AttrValue, RawAttr};
pub use crate::element::{Element, ElementType};
pub use crate::error::{ImarisError, Result};
pub use crate::reader::{ChannelInfo, ImarisReader};
pub use crate::store::{Hdf5Store, HierarchicalStore, MemStore};
pub use crate::volume::{
    to_canonical, ArrayVolume, LazyImarisVolume, PermutedVolume, Selector, Volume5d,
};
