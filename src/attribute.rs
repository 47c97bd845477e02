//! Decoding of the container's loosely typed attribute values.
//!
//! Imaris files store most short text in a legacy character-array encoding:
//! an attribute that logically reads `"600"` may be held as the scalar string
//! `"600"`, as an array of the one-character strings `['6', '0', '0']`, or as
//! an array of the integer code points `[54, 48, 48]`. [`RawAttr`] captures
//! the value as stored, [`RawAttr::decode`] collapses all three encodings to
//! one string, and [`AttrValue`] applies the cast-with-fallback policy on
//! top: a "numeric" field that actually reads `"600 nm"` comes back as text
//! rather than failing, and callers pattern match on the result.
//!
//! [`RawAttr`]: ./enum.RawAttr.html
//! [`AttrValue`]: ./enum.AttrValue.html

use std::convert::TryFrom;

/// An attribute value as stored in the container, before decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAttr {
    /// A scalar string.
    Str(String),
    /// A scalar integer.
    Int(i64),
    /// A scalar floating point number.
    Float(f64),
    /// An array of strings, usually one character each.
    StrArray(Vec<String>),
    /// An array of integers, read as character code points.
    IntArray(Vec<i64>),
    /// An array of floating point numbers.
    FloatArray(Vec<f64>),
}

impl RawAttr {
    /// Decode this raw value into a single string.
    ///
    /// Scalars stringify directly. String arrays concatenate their elements
    /// in order. Integer arrays are read element-wise as code points
    /// (invalid code points are skipped). Any other array stringifies its
    /// first element; empty arrays decode to the empty string.
    ///
    /// # Example
    ///
    /// ```
    /// # use imaris::RawAttr;
    /// let quirky = RawAttr::IntArray(vec![72, 105]);
    /// assert_eq!(quirky.decode(), "Hi");
    /// ```
    pub fn decode(&self) -> String {
        match self {
            RawAttr::Str(s) => s.clone(),
            RawAttr::Int(v) => v.to_string(),
            RawAttr::Float(v) => v.to_string(),
            RawAttr::StrArray(elems) => elems.concat(),
            RawAttr::IntArray(codes) => codes
                .iter()
                .filter_map(|&c| u32::try_from(c).ok().and_then(char::from_u32))
                .collect(),
            RawAttr::FloatArray(elems) => match elems.first() {
                Some(v) => v.to_string(),
                None => String::new(),
            },
        }
    }
}

/// A decoded attribute value after the typed cast with string fallback.
///
/// The container does not guarantee that a nominally numeric attribute
/// parses as a number, so consumers of a "float" field must be prepared to
/// receive [`Text`] instead (e.g. an emission wavelength of `"600 nm"`).
///
/// [`Text`]: #variant.Text
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Text which did not cast to the requested type, or was requested as is.
    Text(String),
    /// A successfully cast integer.
    Int(i64),
    /// A successfully cast floating point number.
    Float(f64),
    /// A successfully cast boolean.
    Bool(bool),
    /// The attribute is missing, or decoded to an empty string.
    Absent,
}

impl AttrValue {
    /// Decode a raw attribute without any cast.
    pub fn text(raw: Option<&RawAttr>) -> AttrValue {
        match decode_non_empty(raw) {
            Some(s) => AttrValue::Text(s),
            None => AttrValue::Absent,
        }
    }

    /// Decode a raw attribute and cast it to an integer,
    /// falling back to the decoded text if the cast fails.
    pub fn int(raw: Option<&RawAttr>) -> AttrValue {
        match decode_non_empty(raw) {
            Some(s) => match s.parse::<i64>() {
                Ok(v) => AttrValue::Int(v),
                Err(_) => AttrValue::Text(s),
            },
            None => AttrValue::Absent,
        }
    }

    /// Decode a raw attribute and cast it to a float,
    /// falling back to the decoded text if the cast fails.
    ///
    /// # Example
    ///
    /// ```
    /// # use imaris::{AttrValue, RawAttr};
    /// let raw = RawAttr::Str("600 nm".to_owned());
    /// assert_eq!(AttrValue::float(Some(&raw)), AttrValue::Text("600 nm".to_owned()));
    /// ```
    pub fn float(raw: Option<&RawAttr>) -> AttrValue {
        match decode_non_empty(raw) {
            Some(s) => match s.parse::<f64>() {
                Ok(v) => AttrValue::Float(v),
                Err(_) => AttrValue::Text(s),
            },
            None => AttrValue::Absent,
        }
    }

    /// Decode a raw attribute and cast it to a boolean.
    ///
    /// Any decoded text other than `"true"` (case insensitive) reads as
    /// `false`, so this cast never falls back to text.
    pub fn boolean(raw: Option<&RawAttr>) -> AttrValue {
        match decode_non_empty(raw) {
            Some(s) => AttrValue::Bool(s.eq_ignore_ascii_case("true")),
            None => AttrValue::Absent,
        }
    }

    /// Numeric view of this value, if it carries one.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            AttrValue::Int(v) => Some(v as f64),
            AttrValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Non-negative integer view of this value, if it carries one.
    pub fn as_usize(&self) -> Option<usize> {
        match *self {
            AttrValue::Int(v) if v >= 0 => Some(v as usize),
            _ => None,
        }
    }

    /// Text view of this value, if it carries one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the attribute was missing or empty.
    pub fn is_absent(&self) -> bool {
        matches!(self, AttrValue::Absent)
    }
}

fn decode_non_empty(raw: Option<&RawAttr>) -> Option<String> {
    let s = raw?.decode();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
