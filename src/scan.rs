//! Discovery of the container's group structure.
//!
//! Imaris numbers its groups inside the group names themselves
//! (`ResolutionLevel 0`, `TimePoint 3`, `Channel 1`), so child enumeration
//! must order them by the embedded number rather than lexicographically:
//! a plain string sort would place `"ResolutionLevel 10"` before
//! `"ResolutionLevel 9"`.

use crate::error::{ImarisError, Result};
use crate::store::HierarchicalStore;

/// Path of the group holding the resolution level hierarchy.
pub const DATASET_ROOT: &str = "DataSet";

/// The structure discovered by scanning a container.
///
/// Timepoint and channel counts are taken at the first resolution level,
/// which by convention holds the full resolution copy of the data.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerLayout {
    /// Resolution level group names, ordered by embedded number.
    pub resolution_levels: Vec<String>,
    /// Number of timepoints at the first resolution level.
    pub timepoints: usize,
    /// Number of channels at the first timepoint.
    pub channels: usize,
}

/// Extract the numeric key embedded in a group name: the first run of
/// ASCII digits, or 0 if the name holds none.
pub fn embedded_number(name: &str) -> u64 {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Children of the group at `path` whose names contain `tag`, sorted by
/// their embedded number.
pub fn tagged_children<S: HierarchicalStore>(
    store: &S,
    path: &str,
    tag: &str,
) -> Result<Vec<String>> {
    let mut names: Vec<String> = store
        .list_children(path)?
        .into_iter()
        .filter(|name| name.contains(tag))
        .collect();
    names.sort_by_key(|name| embedded_number(name));
    Ok(names)
}

/// Scan the hierarchy of a container to determine its dimensions.
///
/// # Errors
///
/// Finding no resolution levels, no timepoints, or no channels is fatal:
/// without them the plane geometry of the container cannot be inferred.
pub fn scan_structure<S: HierarchicalStore>(store: &S) -> Result<ContainerLayout> {
    let resolution_levels = tagged_children(store, DATASET_ROOT, "ResolutionLevel")?;
    let level0 = match resolution_levels.first() {
        Some(name) => format!("{}/{}", DATASET_ROOT, name),
        None => return Err(ImarisError::NoResolutionLevels),
    };

    let timepoints = tagged_children(store, &level0, "TimePoint")?;
    let time0 = match timepoints.first() {
        Some(name) => format!("{}/{}", level0, name),
        None => return Err(ImarisError::NoTimePoints),
    };

    let channels = tagged_children(store, &time0, "Channel")?;
    if channels.is_empty() {
        return Err(ImarisError::NoChannels);
    }

    Ok(ContainerLayout {
        resolution_levels,
        timepoints: timepoints.len(),
        channels: channels.len(),
    })
}
