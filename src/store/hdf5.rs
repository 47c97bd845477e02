//! HDF5 implementation of the hierarchical store.

use crate::attribute::RawAttr;
use crate::element::{Element, ElementType};
use crate::error::{ImarisError, Result};
use hdf5::types::{
    FixedAscii, FixedUnicode, FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode,
};
use hdf5::{Attribute, Dataset, File, H5Type};
use log::warn;
use ndarray::{s, Array2, Array3};
use std::convert::TryFrom;
use std::path::Path;

use super::HierarchicalStore;

/// A read-only Imaris container on disk.
///
/// The open HDF5 handle is owned by this store and released when the store
/// (and therefore the reader built over it) is dropped.
#[derive(Debug)]
pub struct Hdf5Store {
    file: File,
}

impl Hdf5Store {
    /// Open the container file at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Hdf5Store { file })
    }

    fn dataset(&self, path: &str) -> Result<Dataset> {
        self.file
            .dataset(path)
            .map_err(|_| ImarisError::MissingNode(path.to_owned()))
    }
}

impl HierarchicalStore for Hdf5Store {
    fn list_children(&self, path: &str) -> Result<Vec<String>> {
        let group = self
            .file
            .group(path)
            .map_err(|_| ImarisError::MissingNode(path.to_owned()))?;
        Ok(group.member_names()?)
    }

    fn read_attr(&self, path: &str, name: &str) -> Result<Option<RawAttr>> {
        // Attributes live both on groups (metadata nodes) and on the pixel
        // datasets themselves (ImageSizeX/Y/Z).
        let attr = if let Ok(group) = self.file.group(path) {
            match group.attr(name) {
                Ok(attr) => attr,
                Err(_) => return Ok(None),
            }
        } else if let Ok(dataset) = self.file.dataset(path) {
            match dataset.attr(name) {
                Ok(attr) => attr,
                Err(_) => return Ok(None),
            }
        } else {
            return Ok(None);
        };
        read_raw_attr(&attr, path, name)
    }

    fn dataset_type(&self, path: &str) -> Result<ElementType> {
        let descr = self.dataset(path)?.dtype()?.to_descriptor()?;
        ElementType::from_descriptor(&descr)
    }

    fn dataset_shape(&self, path: &str) -> Result<Vec<usize>> {
        Ok(self.dataset(path)?.shape())
    }

    fn read_plane<T: Element>(&self, path: &str, z: usize) -> Result<Array2<T>> {
        let dataset = self.dataset(path)?;
        let shape = dataset.shape();
        match shape.len() {
            3 => {
                if z >= shape[0] {
                    return Err(ImarisError::OutOfBounds(vec![z]));
                }
                Ok(dataset.read_slice::<T, _, _>(s![z, .., ..])?)
            }
            2 => {
                if z > 0 {
                    return Err(ImarisError::OutOfBounds(vec![z]));
                }
                Ok(dataset.read_2d::<T>()?)
            }
            rank => Err(ImarisError::IncorrectRank(rank)),
        }
    }

    fn read_stack<T: Element>(&self, path: &str) -> Result<Array3<T>> {
        let dataset = self.dataset(path)?;
        match dataset.ndim() {
            3 => Ok(dataset.read_slice::<T, _, _>(s![.., .., ..])?),
            2 => Ok(dataset.read_2d::<T>()?.insert_axis(ndarray::Axis(0))),
            rank => Err(ImarisError::IncorrectRank(rank)),
        }
    }
}

fn read_raw_attr(attr: &Attribute, path: &str, name: &str) -> Result<Option<RawAttr>> {
    let descr = attr.dtype()?.to_descriptor()?;
    let scalar = attr.ndim() == 0;
    let raw = match descr {
        TypeDescriptor::Integer(size) => {
            let values = read_integers(attr, size, scalar, true)?;
            if scalar {
                values.into_iter().next().map(RawAttr::Int)
            } else {
                Some(RawAttr::IntArray(values))
            }
        }
        TypeDescriptor::Unsigned(size) => {
            let values = read_integers(attr, size, scalar, false)?;
            if scalar {
                values.into_iter().next().map(RawAttr::Int)
            } else {
                Some(RawAttr::IntArray(values))
            }
        }
        TypeDescriptor::Float(size) => {
            let values = match size {
                FloatSize::U4 => read_elems::<f32>(attr, scalar)?
                    .into_iter()
                    .map(f64::from)
                    .collect(),
                FloatSize::U8 => read_elems::<f64>(attr, scalar)?,
            };
            if scalar {
                values.into_iter().next().map(RawAttr::Float)
            } else {
                Some(RawAttr::FloatArray(values))
            }
        }
        TypeDescriptor::Boolean => {
            let values = read_elems::<bool>(attr, scalar)?;
            Some(RawAttr::Int(values.first().map_or(0, |&b| i64::from(b))))
        }
        TypeDescriptor::FixedAscii(_)
        | TypeDescriptor::FixedUnicode(_)
        | TypeDescriptor::VarLenAscii
        | TypeDescriptor::VarLenUnicode => match read_strings(attr, scalar) {
            Some(mut elems) => {
                if scalar {
                    elems.pop().map(RawAttr::Str)
                } else {
                    Some(RawAttr::StrArray(elems))
                }
            }
            None => {
                warn!("unreadable string attribute {}@{}", name, path);
                None
            }
        },
        other => {
            warn!("attribute {}@{} has unsupported type {:?}", name, path, other);
            None
        }
    };
    Ok(raw)
}

fn read_elems<T: H5Type + Clone>(attr: &Attribute, scalar: bool) -> Result<Vec<T>> {
    if scalar {
        Ok(vec![attr.read_scalar::<T>()?])
    } else {
        Ok(attr.read_raw::<T>()?)
    }
}

fn read_integers(attr: &Attribute, size: IntSize, scalar: bool, signed: bool) -> Result<Vec<i64>> {
    // Read with the exact stored width so no library-side conversion is needed.
    let values = match (size, signed) {
        (IntSize::U1, true) => collect_i64(read_elems::<i8>(attr, scalar)?),
        (IntSize::U2, true) => collect_i64(read_elems::<i16>(attr, scalar)?),
        (IntSize::U4, true) => collect_i64(read_elems::<i32>(attr, scalar)?),
        (IntSize::U8, true) => read_elems::<i64>(attr, scalar)?,
        (IntSize::U1, false) => collect_i64(read_elems::<u8>(attr, scalar)?),
        (IntSize::U2, false) => collect_i64(read_elems::<u16>(attr, scalar)?),
        (IntSize::U4, false) => collect_i64(read_elems::<u32>(attr, scalar)?),
        (IntSize::U8, false) => read_elems::<u64>(attr, scalar)?
            .into_iter()
            .map(|v| i64::try_from(v).unwrap_or(i64::MAX))
            .collect(),
    };
    Ok(values)
}

fn collect_i64<T: Into<i64>>(values: Vec<T>) -> Vec<i64> {
    values.into_iter().map(Into::into).collect()
}

fn read_strings(attr: &Attribute, scalar: bool) -> Option<Vec<String>> {
    // Try the variable-length types first, then the fixed widths Imaris
    // actually writes. Character arrays are fixed width 1.
    if let Ok(v) = read_elems::<VarLenUnicode>(attr, scalar) {
        return Some(v.iter().map(|s| s.to_string()).collect());
    }
    if let Ok(v) = read_elems::<VarLenAscii>(attr, scalar) {
        return Some(v.iter().map(|s| s.to_string()).collect());
    }
    if let Ok(v) = read_elems::<FixedAscii<1>>(attr, scalar) {
        return Some(v.iter().map(|s| s.to_string()).collect());
    }
    if let Ok(v) = read_elems::<FixedUnicode<1>>(attr, scalar) {
        return Some(v.iter().map(|s| s.to_string()).collect());
    }
    if let Ok(v) = read_elems::<FixedAscii<256>>(attr, scalar) {
        return Some(v.iter().map(|s| s.to_string()).collect());
    }
    if let Ok(v) = read_elems::<FixedUnicode<256>>(attr, scalar) {
        return Some(v.iter().map(|s| s.to_string()).collect());
    }
    None
}
