//! Module holding axis-permuted views over canonical volumes.

use super::key::{normalize_key, Sel, Selector, NDIM};
use super::Volume5d;
use crate::element::{Element, ElementType};
use crate::error::{ImarisError, Result};
use ndarray::ArrayD;

/// An axis-permuted view over another canonical volume.
///
/// The permutation maps view axes to the wrapped volume's axes: view axis
/// `i` presents the wrapped volume's axis `perm[i]`, so the view's shape is
/// the wrapped shape reordered by `perm`. No data is copied; index keys are
/// mapped into the wrapped volume's order, and the surviving axes of the
/// result are transposed back into the view's declared order.
///
/// The orthogonal side views of a volume viewer are the motivating case:
/// see [`zy_view`] and [`zx_view`].
///
/// [`zy_view`]: #method.zy_view
/// [`zx_view`]: #method.zx_view
#[derive(Debug, Clone)]
pub struct PermutedVolume<V> {
    inner: V,
    perm: [usize; NDIM],
}

impl<V> PermutedVolume<V> {
    /// Wrap a volume under the given axis permutation.
    ///
    /// # Errors
    ///
    /// `InvalidPermutation` if `perm` is not a bijection over the five
    /// axis positions.
    pub fn new(inner: V, perm: [usize; NDIM]) -> Result<Self> {
        let mut seen = [false; NDIM];
        for &p in &perm {
            if p >= NDIM || seen[p] {
                return Err(ImarisError::InvalidPermutation(perm));
            }
            seen[p] = true;
        }
        Ok(PermutedVolume { inner, perm })
    }

    /// The Z-Y orthogonal view: X takes the second axis, Z the last, so a
    /// collapse of X yields planes in (Y, Z) order.
    pub fn zy_view(inner: V) -> Self {
        PermutedVolume {
            inner,
            perm: [0, 4, 2, 3, 1],
        }
    }

    /// The Z-X orthogonal view: Y takes the second axis, Z swaps into its
    /// place.
    pub fn zx_view(inner: V) -> Self {
        PermutedVolume {
            inner,
            perm: [0, 3, 2, 1, 4],
        }
    }

    /// The axis permutation of this view.
    pub fn permutation(&self) -> [usize; NDIM] {
        self.perm
    }

    /// Consume the view, returning the wrapped volume.
    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<T, V> Volume5d<T> for PermutedVolume<V>
where
    T: Element,
    V: Volume5d<T>,
{
    fn shape(&self) -> [usize; NDIM] {
        let inner = self.inner.shape();
        self.perm.map(|p| inner[p])
    }

    fn dtype(&self) -> ElementType {
        self.inner.dtype()
    }

    fn index(&self, key: &[Selector]) -> Result<ArrayD<T>> {
        let key = normalize_key(key)?;

        // address the wrapped volume in its own axis order
        let mut mapped = [Sel::At(0); NDIM];
        for (axis, &sel) in key.iter().enumerate() {
            mapped[self.perm[axis]] = sel;
        }
        let mapped: Vec<Selector> = mapped.iter().map(|&s| Selector::from(s)).collect();
        let result = self.inner.index(&mapped)?;

        // The wrapped volume emits surviving axes in ascending order of its
        // own axis numbers; reorder them into this view's order.
        let target: Vec<usize> = (0..NDIM)
            .filter(|&axis| key[axis].is_span())
            .map(|axis| self.perm[axis])
            .collect();
        let mut present = target.clone();
        present.sort_unstable();
        let mut position = [0usize; NDIM];
        for (i, &axis) in present.iter().enumerate() {
            position[axis] = i;
        }
        let result_perm: Vec<usize> = target.iter().map(|&axis| position[axis]).collect();

        if result_perm.iter().enumerate().all(|(i, &p)| i == p) {
            Ok(result)
        } else {
            Ok(result.permuted_axes(result_perm))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PermutedVolume;
    use crate::volume::{ArrayVolume, Selector, Volume5d};
    use ndarray::Array5;

    fn volume() -> ArrayVolume<u32> {
        let data = Array5::from_shape_fn((2, 3, 4, 5, 6), |(t, z, c, y, x)| {
            (t * 10000 + z * 1000 + c * 100 + y * 10 + x) as u32
        });
        ArrayVolume::new(data)
    }

    #[test]
    fn shape_follows_the_permutation() {
        let view = PermutedVolume::new(volume(), [0, 4, 2, 3, 1]).unwrap();
        assert_eq!(view.shape(), [2, 6, 4, 5, 3]);
    }

    #[test]
    fn rejects_non_bijections() {
        assert!(PermutedVolume::new(volume(), [0, 0, 2, 3, 4]).is_err());
        assert!(PermutedVolume::new(volume(), [0, 1, 2, 3, 5]).is_err());
    }

    #[test]
    fn identity_permutation_passes_through() {
        let view = PermutedVolume::new(volume(), [0, 1, 2, 3, 4]).unwrap();
        let out = view.index(&[Selector::from(1)]).unwrap();
        assert_eq!(out.shape(), &[3, 4, 5, 6]);
        assert_eq!(out[[2, 3, 4, 5]], 12345);
    }

    #[test]
    fn surviving_axes_come_back_in_view_order() {
        // view order is (T, X, C, Y, Z); collapsing T and X must leave a
        // 3D result ordered (C, Y, Z), not the canonical (Z, C, Y)
        let view = PermutedVolume::new(volume(), [0, 4, 2, 3, 1]).unwrap();
        let out = view.index(&[Selector::from(1), Selector::from(5)]).unwrap();
        assert_eq!(out.shape(), &[4, 5, 3]);
        // view coords (c, y, z) map back to canonical (t=1, z, c, y, x=5)
        assert_eq!(out[[2, 3, 0]], 10235);
        assert_eq!(out[[0, 0, 2]], 12005);
    }

    #[test]
    fn single_axis_collapse_keeps_remaining_order() {
        let view = PermutedVolume::new(volume(), [0, 4, 2, 3, 1]).unwrap();
        let out = view
            .index(&[Selector::all(), Selector::from(0)])
            .unwrap();
        // surviving view axes: (T, C, Y, Z)
        assert_eq!(out.shape(), &[2, 4, 5, 3]);
        assert_eq!(out[[1, 2, 3, 1]], 11230);
    }

    #[test]
    fn round_trip_restores_canonical_order() {
        let volume = volume();
        let view = PermutedVolume::zy_view(&volume);
        let back = PermutedVolume::new(view, [0, 4, 2, 3, 1]).unwrap();
        let out = back.index(&[]).unwrap();
        assert_eq!(out.shape(), &[2, 3, 4, 5, 6]);
        assert_eq!(out[[1, 2, 3, 4, 5]], 12345);
    }
}
