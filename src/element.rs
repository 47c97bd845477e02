//! Pixel element types.
//!
//! [`ElementType`] describes the data type discovered on the container's
//! dataset node, analogous to a dtype tag. The [`Element`] trait marks the
//! primitive types a volume can be read as; each implementation carries its
//! own descriptor so memory-backed volumes can report a dtype without a
//! backing container.
//!
//! [`ElementType`]: ./enum.ElementType.html
//! [`Element`]: ./trait.Element.html

use crate::error::{ImarisError, Result};
use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use hdf5::H5Type;
use num_traits::{NumCast, Zero};
use std::fmt;

/// Data type of the pixel elements stored in a container or buffer.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ElementType {
    /// signed 8 bit integer
    Int8,
    /// signed 16 bit integer
    Int16,
    /// signed 32 bit integer
    Int32,
    /// signed 64 bit integer
    Int64,
    /// unsigned 8 bit integer
    UInt8,
    /// unsigned 16 bit integer
    UInt16,
    /// unsigned 32 bit integer
    UInt32,
    /// unsigned 64 bit integer
    UInt64,
    /// 32 bit float
    Float32,
    /// 64 bit float
    Float64,
}

impl ElementType {
    /// Retrieve the size of an element of this data type, in bytes.
    pub fn size_of(self) -> usize {
        use self::ElementType::*;
        match self {
            Int8 | UInt8 => 1,
            Int16 | UInt16 => 2,
            Int32 | UInt32 | Float32 => 4,
            Int64 | UInt64 | Float64 => 8,
        }
    }

    pub(crate) fn from_descriptor(descr: &TypeDescriptor) -> Result<ElementType> {
        match *descr {
            TypeDescriptor::Integer(IntSize::U1) => Ok(ElementType::Int8),
            TypeDescriptor::Integer(IntSize::U2) => Ok(ElementType::Int16),
            TypeDescriptor::Integer(IntSize::U4) => Ok(ElementType::Int32),
            TypeDescriptor::Integer(IntSize::U8) => Ok(ElementType::Int64),
            TypeDescriptor::Unsigned(IntSize::U1) => Ok(ElementType::UInt8),
            TypeDescriptor::Unsigned(IntSize::U2) => Ok(ElementType::UInt16),
            TypeDescriptor::Unsigned(IntSize::U4) => Ok(ElementType::UInt32),
            TypeDescriptor::Unsigned(IntSize::U8) => Ok(ElementType::UInt64),
            TypeDescriptor::Float(FloatSize::U4) => Ok(ElementType::Float32),
            TypeDescriptor::Float(FloatSize::U8) => Ok(ElementType::Float64),
            ref other => Err(ImarisError::UnsupportedDataType(format!("{:?}", other))),
        }
    }

    fn name(self) -> &'static str {
        use self::ElementType::*;
        match self {
            Int8 => "i8",
            Int16 => "i16",
            Int32 => "i32",
            Int64 => "i64",
            UInt8 => "u8",
            UInt16 => "u16",
            UInt32 => "u32",
            UInt64 => "u64",
            Float32 => "f32",
            Float64 => "f64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for the primitive types that a volume can be read as.
pub trait Element: H5Type + Clone + Zero + NumCast + 'static {
    /// The dynamic descriptor matching this element type.
    const TYPE: ElementType;
}

impl Element for i8 {
    const TYPE: ElementType = ElementType::Int8;
}
impl Element for i16 {
    const TYPE: ElementType = ElementType::Int16;
}
impl Element for i32 {
    const TYPE: ElementType = ElementType::Int32;
}
impl Element for i64 {
    const TYPE: ElementType = ElementType::Int64;
}
impl Element for u8 {
    const TYPE: ElementType = ElementType::UInt8;
}
impl Element for u16 {
    const TYPE: ElementType = ElementType::UInt16;
}
impl Element for u32 {
    const TYPE: ElementType = ElementType::UInt32;
}
impl Element for u64 {
    const TYPE: ElementType = ElementType::UInt64;
}
impl Element for f32 {
    const TYPE: ElementType = ElementType::Float32;
}
impl Element for f64 {
    const TYPE: ElementType = ElementType::Float64;
}
