//! Index keys for the canonical 5D contract.
//!
//! A key is a sequence of up to five per-axis selectors, addressed in
//! canonical (T, Z, C, Y, X) order. Keys shorter than five axes are right
//! padded with full-axis selectors, and a single wildcard placeholder
//! expands in place to whatever number of full-axis selectors brings the
//! key to five. Range selectors follow slice semantics: negative bounds
//! count from the end of the axis and out-of-range bounds clamp instead of
//! failing.

use crate::error::{ImarisError, Result};
use ndarray::{ArrayD, ArrayViewD, Axis, Slice};
use num_traits::Zero;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// Number of axes every canonical volume presents.
pub const NDIM: usize = 5;

/// One per-axis selector of an index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Select a single coordinate, collapsing the axis from the result.
    Index(usize),
    /// Select a bounded range of coordinates, keeping the axis.
    Span {
        /// First selected coordinate; negative values count from the end.
        /// Defaults to the start of the axis (the end for negative steps).
        start: Option<isize>,
        /// Exclusive upper bound; negative values count from the end.
        /// Defaults to the end of the axis (the start for negative steps).
        stop: Option<isize>,
        /// Stride between selected coordinates; must not be zero.
        step: isize,
    },
    /// Wildcard placeholder, expanding to as many full-axis selectors as
    /// needed to bring the key to five axes. At most one per key.
    Ellipsis,
}

impl Selector {
    /// The full-axis selector.
    pub fn all() -> Selector {
        Selector::Span {
            start: None,
            stop: None,
            step: 1,
        }
    }

    /// A range selector with an explicit stride.
    pub fn stepped(start: Option<isize>, stop: Option<isize>, step: isize) -> Selector {
        Selector::Span { start, stop, step }
    }
}

impl From<usize> for Selector {
    fn from(index: usize) -> Selector {
        Selector::Index(index)
    }
}

impl From<Range<isize>> for Selector {
    fn from(range: Range<isize>) -> Selector {
        Selector::Span {
            start: Some(range.start),
            stop: Some(range.end),
            step: 1,
        }
    }
}

impl From<RangeFrom<isize>> for Selector {
    fn from(range: RangeFrom<isize>) -> Selector {
        Selector::Span {
            start: Some(range.start),
            stop: None,
            step: 1,
        }
    }
}

impl From<RangeTo<isize>> for Selector {
    fn from(range: RangeTo<isize>) -> Selector {
        Selector::Span {
            start: None,
            stop: Some(range.end),
            step: 1,
        }
    }
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Selector {
        Selector::all()
    }
}

/// A selector with the wildcard already expanded away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sel {
    At(usize),
    Over {
        start: Option<isize>,
        stop: Option<isize>,
        step: isize,
    },
}

const FULL: Sel = Sel::Over {
    start: None,
    stop: None,
    step: 1,
};

impl Sel {
    pub(crate) fn is_span(self) -> bool {
        matches!(self, Sel::Over { .. })
    }
}

impl From<Sel> for Selector {
    fn from(sel: Sel) -> Selector {
        match sel {
            Sel::At(i) => Selector::Index(i),
            Sel::Over { start, stop, step } => Selector::Span { start, stop, step },
        }
    }
}

/// Normalize a raw key to exactly five explicit selectors.
pub(crate) fn normalize_key(key: &[Selector]) -> Result<[Sel; NDIM]> {
    let wildcards = key
        .iter()
        .filter(|s| matches!(s, Selector::Ellipsis))
        .count();
    if wildcards > 1 {
        return Err(ImarisError::DuplicateWildcard);
    }
    let explicit = key.len() - wildcards;
    if explicit > NDIM {
        return Err(ImarisError::KeyTooLong(key.len()));
    }

    let mut out = [FULL; NDIM];
    let mut axis = 0;
    for sel in key {
        match *sel {
            Selector::Index(i) => {
                out[axis] = Sel::At(i);
                axis += 1;
            }
            Selector::Span { start, stop, step } => {
                out[axis] = Sel::Over { start, stop, step };
                axis += 1;
            }
            // wildcard: leave full selectors in place
            Selector::Ellipsis => axis += NDIM - explicit,
        }
    }
    Ok(out)
}

/// A range selector resolved against a concrete axis length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedSpan {
    pub start: isize,
    pub stop: isize,
    pub step: isize,
}

impl ResolvedSpan {
    /// Number of coordinates this span selects.
    pub fn len(self) -> usize {
        let (lo, hi, step) = if self.step > 0 {
            (self.start, self.stop, self.step)
        } else {
            (self.stop, self.start, -self.step)
        };
        if hi > lo {
            ((hi - lo - 1) / step + 1) as usize
        } else {
            0
        }
    }

    /// The selected coordinates, in selection order.
    pub fn indices(self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len());
        let mut i = self.start;
        while (self.step > 0 && i < self.stop) || (self.step < 0 && i > self.stop) {
            out.push(i as usize);
            i += self.step;
        }
        out
    }

    /// Whether this span selects the whole axis front to back, stride one.
    pub fn is_full(self, len: usize) -> bool {
        self.step == 1 && self.start == 0 && self.stop == len as isize
    }
}

/// Resolve range bounds against an axis length, with defaulting and
/// clamping equivalent to `slice.indices` semantics.
pub(crate) fn resolve_span(
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
    len: usize,
) -> Result<ResolvedSpan> {
    if step == 0 {
        return Err(ImarisError::ZeroStep);
    }
    let n = len as isize;
    let (lower, upper) = if step < 0 { (-1, n - 1) } else { (0, n) };
    let start = match start {
        None => {
            if step < 0 {
                upper
            } else {
                lower
            }
        }
        Some(v) if v < 0 => (v + n).max(lower),
        Some(v) => v.min(upper),
    };
    let stop = match stop {
        None => {
            if step < 0 {
                lower
            } else {
                upper
            }
        }
        Some(v) if v < 0 => (v + n).max(lower),
        Some(v) => v.min(upper),
    };
    Ok(ResolvedSpan { start, stop, step })
}

/// Apply one selector per axis of `view`, producing an owned result whose
/// rank equals the number of range selectors.
pub(crate) fn apply_selectors<T>(view: ArrayViewD<'_, T>, sels: &[Sel]) -> Result<ArrayD<T>>
where
    T: Clone + Zero,
{
    debug_assert_eq!(view.ndim(), sels.len());
    let mut v = view;
    // Collapses and backward gathers are deferred so that axis numbers stay
    // stable while the forward spans are applied as plain views.
    let mut collapses: Vec<(usize, usize)> = Vec::new();
    let mut gathers: Vec<(usize, Vec<usize>)> = Vec::new();
    for (axis, sel) in sels.iter().enumerate() {
        let len = v.len_of(Axis(axis));
        match *sel {
            Sel::At(i) => {
                if i >= len {
                    return Err(ImarisError::OutOfBounds(vec![i]));
                }
                collapses.push((axis, i));
            }
            Sel::Over { start, stop, step } => {
                let span = resolve_span(start, stop, step, len)?;
                if span.step > 0 {
                    let stop = span.stop.max(span.start);
                    v.slice_axis_inplace(Axis(axis), Slice::new(span.start, Some(stop), span.step));
                } else {
                    gathers.push((axis, span.indices()));
                }
            }
        }
    }
    for &(axis, i) in collapses.iter().rev() {
        v = v.index_axis_move(Axis(axis), i);
    }
    let mut out = v.to_owned();
    for (axis, indices) in gathers {
        let shift = collapses.iter().filter(|&&(a, _)| a < axis).count();
        out = out.select(Axis(axis - shift), &indices);
    }
    Ok(out)
}
