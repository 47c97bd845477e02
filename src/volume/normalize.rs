//! Canonicalization of arbitrary-rank arrays into the 5D contract.
//!
//! Raw in-memory images arrive with anywhere between two and five axes and
//! no agreed order. [`to_canonical`] brings them into the canonical
//! (T, Z, C, Y, X) shape, either from an explicit axis label string
//! (characters from `tzcyx`, one per input axis) or from rank-based
//! heuristics, and wraps the result in an [`ArrayVolume`]. Restoring the
//! missing axes is a broadcast to size-1 axes, never a data copy.
//!
//! [`to_canonical`]: ./fn.to_canonical.html
//! [`ArrayVolume`]: ../inmem/struct.ArrayVolume.html

use super::inmem::ArrayVolume;
use super::key::NDIM;
use crate::element::Element;
use crate::error::{ImarisError, Result};
use ndarray::{ArrayD, Axis};

/// The canonical axis labels, in canonical order.
const AXIS_LABELS: [char; NDIM] = ['t', 'z', 'c', 'y', 'x'];

/// Canonicalize an array of rank 2 to 5 into a memory-backed volume.
///
/// With `axes` given, it names the meaning of each input axis (e.g.
/// `"zcyx"`, case insensitive) and must match the input rank; the array is
/// permuted accordingly and absent axes become size-1 axes. Without it,
/// rank decides: 2 reads as (Y, X), 3 as (Z, Y, X) or as an (Y, X, RGB)
/// image (see below), 4 as (Z, C, Y, X), and 5 as already canonical.
///
/// `rgb` controls the rank-3 ambiguity: `Some(true)` forces the RGB
/// reading, `Some(false)` forbids it, and `None` auto-detects (a last axis
/// of 3 or 4 with both spatial axes larger than 4).
///
/// # Example
///
/// ```
/// use imaris::volume::{to_canonical, Volume5d};
/// use ndarray::ArrayD;
///
/// let stack = ArrayD::<u8>::zeros(ndarray::IxDyn(&[10, 100, 100]));
/// let volume = to_canonical(stack, None, None)?;
/// assert_eq!(volume.shape(), [1, 10, 1, 100, 100]);
/// # Ok::<(), imaris::ImarisError>(())
/// ```
pub fn to_canonical<T: Element>(
    data: ArrayD<T>,
    axes: Option<&str>,
    rgb: Option<bool>,
) -> Result<ArrayVolume<T>> {
    match axes {
        Some(axes) => from_labels(data, axes),
        None => from_rank(data, rgb),
    }
}

fn from_labels<T: Element>(data: ArrayD<T>, axes: &str) -> Result<ArrayVolume<T>> {
    let labels: Vec<char> = axes.chars().map(|c| c.to_ascii_lowercase()).collect();
    if labels.len() != data.ndim() {
        return Err(ImarisError::AxesMismatch(labels.len(), data.ndim()));
    }

    // input position of each canonical axis, if present
    let mut source = [None; NDIM];
    for (pos, &label) in labels.iter().enumerate() {
        let axis = AXIS_LABELS
            .iter()
            .position(|&c| c == label)
            .ok_or(ImarisError::BadAxisLabel(label))?;
        if source[axis].is_some() {
            return Err(ImarisError::BadAxisLabel(label));
        }
        source[axis] = Some(pos);
    }

    let perm: Vec<usize> = source.iter().filter_map(|&pos| pos).collect();
    let mut out = data.permuted_axes(perm);
    for (axis, pos) in source.iter().enumerate() {
        if pos.is_none() {
            out = out.insert_axis(Axis(axis));
        }
    }
    ArrayVolume::from_dyn(out)
}

fn from_rank<T: Element>(data: ArrayD<T>, rgb: Option<bool>) -> Result<ArrayVolume<T>> {
    let out = match data.ndim() {
        // (Y, X)
        2 => data
            .insert_axis(Axis(0))
            .insert_axis(Axis(0))
            .insert_axis(Axis(0)),
        3 => {
            let rgb = rgb.unwrap_or_else(|| looks_like_rgb(data.shape()));
            if rgb {
                // (Y, X, C) -> (1, 1, C, Y, X)
                data.permuted_axes(vec![2, 0, 1])
                    .insert_axis(Axis(0))
                    .insert_axis(Axis(0))
            } else {
                // (Z, Y, X) -> (1, Z, 1, Y, X)
                data.insert_axis(Axis(0)).insert_axis(Axis(2))
            }
        }
        // (Z, C, Y, X)
        4 => data.insert_axis(Axis(0)),
        5 => data,
        rank => return Err(ImarisError::IncorrectRank(rank)),
    };
    ArrayVolume::from_dyn(out)
}

/// Whether a rank-3 array reads as a color image rather than a Z stack:
/// a last axis of 3 or 4 with both spatial axes clearly larger.
fn looks_like_rgb(shape: &[usize]) -> bool {
    shape.len() == 3 && (shape[2] == 3 || shape[2] == 4) && shape[0] > 4 && shape[1] > 4
}
