//! This module defines the canonical 5D volume API, as well as the proxy
//! types giving lazy access to disk-backed and in-memory image data.
//!
//! Every volume, regardless of where its data lives, presents exactly five
//! axes in the fixed order (Time, Z, Channel, Y, X) and accepts index keys
//! addressed in that order. Integer selectors collapse their axis, range
//! selectors keep it, so the rank of a result always equals the number of
//! range selectors in the (normalized) key. Reading never projects across
//! an axis: a Z range comes back as a stacked multi-plane block, and any
//! intensity projection is the consumer's business.

pub mod inmem;
pub mod key;
pub mod lazy;
pub mod normalize;
pub mod permuted;

pub use self::inmem::ArrayVolume;
pub use self::key::{Selector, NDIM};
pub use self::lazy::LazyImarisVolume;
pub use self::normalize::to_canonical;
pub use self::permuted::PermutedVolume;

use crate::element::{Element, ElementType};
use crate::error::Result;
use ndarray::ArrayD;

/// Public API for canonical 5D image data.
///
/// Implementations are cheap, stateless views over their backing store;
/// it is fine to build many volumes over one reader or buffer.
pub trait Volume5d<T: Element> {
    /// The canonical (T, Z, C, Y, X) shape. Always five axes.
    fn shape(&self) -> [usize; NDIM];

    /// The element type of the backing store.
    fn dtype(&self) -> ElementType;

    /// Resolve an index key of up to five selectors against this volume.
    ///
    /// The key is right padded with full-axis selectors, and one
    /// [`Selector::Ellipsis`] may stand in for any number of them. The
    /// result owns its data and has one axis per range selector.
    ///
    /// [`Selector::Ellipsis`]: ./enum.Selector.html#variant.Ellipsis
    fn index(&self, key: &[Selector]) -> Result<ArrayD<T>>;

    /// Number of axes every canonical volume presents.
    fn ndim(&self) -> usize {
        NDIM
    }
}

impl<'a, T, V> Volume5d<T> for &'a V
where
    T: Element,
    V: Volume5d<T>,
{
    fn shape(&self) -> [usize; NDIM] {
        (**self).shape()
    }

    fn dtype(&self) -> ElementType {
        (**self).dtype()
    }

    fn index(&self, key: &[Selector]) -> Result<ArrayD<T>> {
        (**self).index(key)
    }
}
