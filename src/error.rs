//! Error types for the Imaris access layer.
//!
//! Structural problems in the container (no resolution levels, a missing
//! timepoint group) abort the operation that hit them. Metadata problems
//! (a malformed timestamp, a unit-suffixed wavelength) never surface here:
//! they degrade to documented defaults at the call site.

use quick_error::quick_error;
use std::io::Error as IoError;

quick_error! {
    /// Error type for all operations of this crate.
    #[derive(Debug)]
    pub enum ImarisError {
        /// The container's dataset root holds no resolution level groups.
        NoResolutionLevels {
            display("no resolution levels found in container")
        }
        /// The reference resolution level holds no timepoint groups.
        NoTimePoints {
            display("no timepoints found in container")
        }
        /// The reference timepoint holds no channel groups.
        NoChannels {
            display("no channels found in container")
        }
        /// Requested a resolution level past the number discovered on scan.
        ResolutionLevelOutOfRange(requested: usize, available: usize) {
            display("resolution level {} unavailable ({} levels present)", requested, available)
        }
        /// No group for the given timepoint index under either naming convention.
        TimePointNotFound(index: usize) {
            display("timepoint {} not found", index)
        }
        /// No group for the given channel index under either naming convention.
        ChannelNotFound(index: usize) {
            display("channel {} not found", index)
        }
        /// A group or dataset node expected in the container is absent.
        MissingNode(path: String) {
            display("node not found in container: {}", path)
        }
        /// Attempted to read a coordinate outside the volume boundaries.
        OutOfBounds(coords: Vec<usize>) {
            display("out of bounds access to volume: {:?}", coords)
        }
        /// Array rank outside the supported 2 to 5 range.
        IncorrectRank(rank: usize) {
            display("unsupported array rank {}", rank)
        }
        /// Axis label string length does not match the array rank.
        AxesMismatch(axes: usize, rank: usize) {
            display("axis label length ({}) must match array rank ({})", axes, rank)
        }
        /// Axis label string holds a character outside `tzcyx`, or a repeat.
        BadAxisLabel(label: char) {
            display("invalid or repeated axis label '{}'", label)
        }
        /// An index key holds more than five selectors.
        KeyTooLong(len: usize) {
            display("index key has {} selectors, at most 5 allowed", len)
        }
        /// An index key holds more than one wildcard placeholder.
        DuplicateWildcard {
            display("at most one wildcard selector may appear in a key")
        }
        /// A range selector with a step of zero.
        ZeroStep {
            display("range selector step must not be zero")
        }
        /// The given axis mapping is not a bijection over the five axes.
        InvalidPermutation(perm: [usize; 5]) {
            display("invalid axis permutation {:?}", perm)
        }
        /// The container's pixel type is not supported by this crate.
        UnsupportedDataType(descr: String) {
            display("unsupported data type: {}", descr)
        }
        /// I/O error.
        Io(err: IoError) {
            from()
            source(err)
            display("{}", err)
        }
        /// Error reported by the underlying HDF5 library.
        Hdf5(err: hdf5::Error) {
            from()
            source(err)
            display("{}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, ImarisError>;
