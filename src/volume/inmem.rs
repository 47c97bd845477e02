//! Module holding the in-memory implementation of the canonical volume.

use super::key::{normalize_key, Selector, NDIM};
use super::Volume5d;
use crate::element::{Element, ElementType};
use crate::error::{ImarisError, Result};
use ndarray::{Array5, ArrayD, Ix5};

/// A canonical 5D volume over a buffer already held in memory.
///
/// The buffer must already be in canonical (T, Z, C, Y, X) order; use
/// [`to_canonical`] to bring arbitrary-rank data into that shape first.
/// Indexing delegates straight to the buffer, with no I/O and no axis
/// reordering.
///
/// [`to_canonical`]: ../normalize/fn.to_canonical.html
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayVolume<T> {
    data: Array5<T>,
}

impl<T: Element> ArrayVolume<T> {
    /// Wrap a canonical 5D buffer.
    pub fn new(data: Array5<T>) -> Self {
        ArrayVolume { data }
    }

    /// Wrap a dynamic-rank buffer which must have exactly five axes.
    pub fn from_dyn(data: ArrayD<T>) -> Result<Self> {
        let rank = data.ndim();
        let data = data
            .into_dimensionality::<Ix5>()
            .map_err(|_| ImarisError::IncorrectRank(rank))?;
        Ok(ArrayVolume { data })
    }

    /// Consume the volume, returning the backing buffer.
    pub fn into_inner(self) -> Array5<T> {
        self.data
    }

    /// A view of the backing buffer.
    pub fn as_array(&self) -> ndarray::ArrayView5<'_, T> {
        self.data.view()
    }
}

impl<T: Element> Volume5d<T> for ArrayVolume<T> {
    fn shape(&self) -> [usize; NDIM] {
        let (t, z, c, y, x) = self.data.dim();
        [t, z, c, y, x]
    }

    fn dtype(&self) -> ElementType {
        T::TYPE
    }

    fn index(&self, key: &[Selector]) -> Result<ArrayD<T>> {
        let key = normalize_key(key)?;
        super::key::apply_selectors(self.data.view().into_dyn(), &key)
    }
}

#[cfg(test)]
mod tests {
    use super::ArrayVolume;
    use crate::element::ElementType;
    use crate::volume::{Selector, Volume5d};
    use ndarray::{Array5, ArrayD};

    fn volume() -> ArrayVolume<u16> {
        let data = Array5::from_shape_fn((2, 3, 2, 4, 5), |(t, z, c, y, x)| {
            (t * 10000 + z * 1000 + c * 100 + y * 10 + x) as u16
        });
        ArrayVolume::new(data)
    }

    #[test]
    fn full_key_returns_whole_buffer() {
        let v = volume();
        let out = v.index(&[]).unwrap();
        assert_eq!(out.shape(), &[2, 3, 2, 4, 5]);
        assert_eq!(v.dtype(), ElementType::UInt16);
    }

    #[test]
    fn integer_selectors_collapse_axes() {
        let v = volume();
        let out = v.index(&[Selector::from(1), Selector::from(2)]).unwrap();
        assert_eq!(out.shape(), &[2, 4, 5]);
        assert_eq!(out[[1, 3, 4]], 12134);

        let out = v
            .index(&[
                Selector::from(0),
                Selector::from(1),
                Selector::from(1),
                Selector::from(2),
                Selector::from(3),
            ])
            .unwrap();
        assert_eq!(out.ndim(), 0);
        assert_eq!(out.first().copied(), Some(1123));
    }

    #[test]
    fn wildcard_addresses_trailing_axes() {
        let v = volume();
        let out = v
            .index(&[Selector::Ellipsis, Selector::from(2), Selector::from(3)])
            .unwrap();
        assert_eq!(out.shape(), &[2, 3, 2]);
        assert_eq!(out[[1, 2, 0]], 12023);
    }

    #[test]
    fn rejects_non_5d_buffers() {
        let data = ArrayD::<u16>::zeros(ndarray::IxDyn(&[2, 3, 4]));
        assert!(ArrayVolume::from_dyn(data).is_err());
    }
}
