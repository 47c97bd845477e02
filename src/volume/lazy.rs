//! Module holding the lazy, disk-backed implementation of the canonical
//! volume.
//!
//! [`LazyImarisVolume`] reorders the reader's native (T, C, Z, Y, X)
//! addressing into the canonical (T, Z, C, Y, X) contract and materializes
//! no more data than an index key asks for. The resolution order is Time
//! outermost, then Channel, then Z: that ordering is what lets a full Z
//! range collapse into the reader's single bulk stack read instead of one
//! request per plane, and it must be preserved.
//!
//! [`LazyImarisVolume`]: ./struct.LazyImarisVolume.html

use super::key::{apply_selectors, normalize_key, resolve_span, Sel, Selector, NDIM};
use super::Volume5d;
use crate::element::{Element, ElementType};
use crate::error::Result;
use crate::reader::ImarisReader;
use crate::store::HierarchicalStore;
use ndarray::{ArrayD, Axis, IxDyn};

/// A canonical 5D volume lazily reading from an [`ImarisReader`].
///
/// The volume borrows its reader, so it cannot outlive the open container
/// handle. It holds no state beyond the cached shape and element type, and
/// building several volumes over one reader is cheap.
///
/// [`ImarisReader`]: ../../reader/struct.ImarisReader.html
#[derive(Debug)]
pub struct LazyImarisVolume<'r, S> {
    reader: &'r ImarisReader<S>,
    shape: [usize; NDIM],
    dtype: ElementType,
}

impl<'r, S> LazyImarisVolume<'r, S>
where
    S: HierarchicalStore,
{
    /// Build a canonical volume over the given reader, at full resolution.
    pub fn new(reader: &'r ImarisReader<S>) -> Self {
        let [t, c, z, y, x] = reader.shape();
        LazyImarisVolume {
            reader,
            shape: [t, z, c, y, x],
            dtype: reader.dtype(),
        }
    }

    /// The reader this volume reads through.
    pub fn reader(&self) -> &'r ImarisReader<S> {
        self.reader
    }

    /// Read one timepoint with the Z and Channel selectors applied,
    /// producing a block in canonical (Z, C, Y, X) axis order with the
    /// integer-selected axes collapsed.
    fn read_timepoint<T: Element>(&self, t: usize, z_sel: Sel, c_sel: Sel) -> Result<ArrayD<T>> {
        match c_sel {
            Sel::At(c) => self.read_z_slice(c, t, z_sel),
            Sel::Over { start, stop, step } => {
                let span = resolve_span(start, stop, step, self.shape[2])?;
                let channels = span.indices();
                if channels.is_empty() {
                    let mut dims = Vec::with_capacity(4);
                    if let Sel::Over { start, stop, step } = z_sel {
                        dims.push(resolve_span(start, stop, step, self.shape[1])?.len());
                    }
                    dims.extend_from_slice(&[0, self.shape[3], self.shape[4]]);
                    return Ok(ArrayD::zeros(IxDyn(&dims)));
                }
                let blocks = channels
                    .into_iter()
                    .map(|c| self.read_z_slice(c, t, z_sel))
                    .collect::<Result<Vec<_>>>()?;
                let mut stacked = stack_blocks(&blocks);
                // stacking puts Channel first; when Z kept its axis the
                // canonical order wants it ahead of Channel
                if stacked.ndim() == 4 {
                    stacked = stacked.permuted_axes(vec![1, 0, 2, 3]);
                }
                Ok(stacked)
            }
        }
    }

    /// Read a Z selection for one channel and timepoint.
    fn read_z_slice<T: Element>(&self, c: usize, t: usize, z_sel: Sel) -> Result<ArrayD<T>> {
        match z_sel {
            Sel::At(z) => self.reader.read(c, t, Some(z), 0),
            Sel::Over { start, stop, step } => {
                let span = resolve_span(start, stop, step, self.shape[1])?;
                if span.is_full(self.shape[1]) {
                    // whole stack in one request
                    return self.reader.read(c, t, None, 0);
                }
                let planes = span.indices();
                if planes.is_empty() {
                    return Ok(ArrayD::zeros(IxDyn(&[0, self.shape[3], self.shape[4]])));
                }
                let blocks = planes
                    .into_iter()
                    .map(|z| self.reader.read(c, t, Some(z), 0))
                    .collect::<Result<Vec<_>>>()?;
                Ok(stack_blocks(&blocks))
            }
        }
    }

    /// Result shape of a key whose Time range selects nothing.
    fn empty_time_result<T: Element>(&self, key: &[Sel; NDIM]) -> Result<ArrayD<T>> {
        let mut dims = vec![0];
        for (axis, sel) in key.iter().enumerate().skip(1) {
            if let Sel::Over { start, stop, step } = *sel {
                dims.push(resolve_span(start, stop, step, self.shape[axis])?.len());
            }
        }
        Ok(ArrayD::zeros(IxDyn(&dims)))
    }
}

impl<'r, S, T> Volume5d<T> for LazyImarisVolume<'r, S>
where
    S: HierarchicalStore,
    T: Element,
{
    fn shape(&self) -> [usize; NDIM] {
        self.shape
    }

    fn dtype(&self) -> ElementType {
        self.dtype
    }

    fn index(&self, key: &[Selector]) -> Result<ArrayD<T>> {
        let key = normalize_key(key)?;
        let [t_sel, z_sel, c_sel, y_sel, x_sel] = key;

        let block = match t_sel {
            Sel::At(t) => self.read_timepoint(t, z_sel, c_sel)?,
            Sel::Over { start, stop, step } => {
                let span = resolve_span(start, stop, step, self.shape[0])?;
                let times = span.indices();
                if times.is_empty() {
                    return self.empty_time_result(&key);
                }
                let blocks = times
                    .into_iter()
                    .map(|t| self.read_timepoint(t, z_sel, c_sel))
                    .collect::<Result<Vec<_>>>()?;
                stack_blocks(&blocks)
            }
        };

        // Y and X apply last, on the two trailing axes of the assembled block
        let lead = block.ndim() - 2;
        let mut sels = vec![
            Sel::Over {
                start: None,
                stop: None,
                step: 1,
            };
            lead
        ];
        sels.push(y_sel);
        sels.push(x_sel);
        apply_selectors(block.view(), &sels)
    }
}

/// Stack uniform blocks along a new leading axis.
fn stack_blocks<T: Element>(blocks: &[ArrayD<T>]) -> ArrayD<T> {
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    ndarray::stack(Axis(0), &views).expect("blocks share one shape")
}
