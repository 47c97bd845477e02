//! In-memory implementation of the hierarchical store.
//!
//! `MemStore` holds a synthetic container as a flat map of slash separated
//! paths. It exists for building small containers programmatically, most
//! prominently in tests, and mirrors the layout of a real file: groups,
//! attributes, and datasets of rank 2 or 3.

use crate::attribute::RawAttr;
use crate::element::{Element, ElementType};
use crate::error::{ImarisError, Result};
use ndarray::{Array2, Array3, ArrayD, Axis};
use num_traits::NumCast;
use std::collections::BTreeMap;

use super::HierarchicalStore;

/// A hierarchical container held in memory.
#[derive(Debug, Default)]
pub struct MemStore {
    nodes: BTreeMap<String, Node>,
}

#[derive(Debug, Default)]
struct Node {
    attrs: BTreeMap<String, RawAttr>,
    data: Option<MemDataset>,
}

#[derive(Debug)]
struct MemDataset {
    dtype: ElementType,
    values: ArrayD<f64>,
}

impl MemStore {
    /// Create an empty container.
    pub fn new() -> Self {
        MemStore::default()
    }

    /// Add an (empty) group node, creating missing ancestors.
    pub fn add_group(&mut self, path: &str) {
        let path = normalize(path);
        if path.is_empty() {
            return;
        }
        if let Some((parent, _)) = path.rsplit_once('/') {
            self.add_group(parent);
        }
        let _ = self.nodes.entry(path.to_owned()).or_default();
    }

    /// Set a raw attribute on the node at `path`, creating it if needed.
    pub fn set_attr(&mut self, path: &str, name: &str, value: RawAttr) {
        self.add_group(path);
        if let Some(node) = self.nodes.get_mut(normalize(path)) {
            let _ = node.attrs.insert(name.to_owned(), value);
        }
    }

    /// Add a dataset node at `path` with the given declared element type.
    ///
    /// Values are held as `f64` and cast on read; the declared type is what
    /// [`dataset_type`] reports.
    ///
    /// [`dataset_type`]: ../trait.HierarchicalStore.html#tymethod.dataset_type
    pub fn add_dataset(&mut self, path: &str, dtype: ElementType, values: ArrayD<f64>) {
        self.add_group(path);
        if let Some(node) = self.nodes.get_mut(normalize(path)) {
            node.data = Some(MemDataset { dtype, values });
        }
    }

    fn node(&self, path: &str) -> Result<&Node> {
        self.nodes
            .get(normalize(path))
            .ok_or_else(|| ImarisError::MissingNode(path.to_owned()))
    }

    fn dataset(&self, path: &str) -> Result<&MemDataset> {
        self.node(path)?
            .data
            .as_ref()
            .ok_or_else(|| ImarisError::MissingNode(path.to_owned()))
    }
}

impl HierarchicalStore for MemStore {
    fn list_children(&self, path: &str) -> Result<Vec<String>> {
        let path = normalize(path);
        let _ = self.node(path)?;
        let prefix = format!("{}/", path);
        let children = self
            .nodes
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_owned)
            .collect();
        Ok(children)
    }

    fn read_attr(&self, path: &str, name: &str) -> Result<Option<RawAttr>> {
        match self.nodes.get(normalize(path)) {
            Some(node) => Ok(node.attrs.get(name).cloned()),
            None => Ok(None),
        }
    }

    fn dataset_type(&self, path: &str) -> Result<ElementType> {
        Ok(self.dataset(path)?.dtype)
    }

    fn dataset_shape(&self, path: &str) -> Result<Vec<usize>> {
        Ok(self.dataset(path)?.values.shape().to_vec())
    }

    fn read_plane<T: Element>(&self, path: &str, z: usize) -> Result<Array2<T>> {
        let values = &self.dataset(path)?.values;
        let stack = as_stack(values)?;
        if z >= stack.len_of(Axis(0)) {
            return Err(ImarisError::OutOfBounds(vec![z]));
        }
        Ok(stack.index_axis(Axis(0), z).mapv(cast::<T>))
    }

    fn read_stack<T: Element>(&self, path: &str) -> Result<Array3<T>> {
        let values = &self.dataset(path)?.values;
        Ok(as_stack(values)?.mapv(cast::<T>))
    }
}

fn as_stack(values: &ArrayD<f64>) -> Result<ndarray::ArrayView3<'_, f64>> {
    let view = match values.ndim() {
        3 => values.view(),
        2 => values.view().insert_axis(Axis(0)),
        rank => return Err(ImarisError::IncorrectRank(rank)),
    };
    view.into_dimensionality()
        .map_err(|_| ImarisError::IncorrectRank(values.ndim()))
}

fn cast<T: Element>(value: f64) -> T {
    <T as NumCast>::from(value).unwrap_or_else(T::zero)
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}
