//! Core types for the TDMS decoder library
//!
//! This module defines the fundamental types the reader produces: the TDMS
//! on-disk data type codes, property values, and the error type. The reader
//! is stateless and only outputs parsed channel data - it does not select,
//! relabel, or convert anything.

use chrono::{DateTime, Utc};
use std::fmt;

/// Timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, TdmsError>;

/// Errors that can occur while reading a TDMS file
#[derive(Debug, thiserror::Error)]
pub enum TdmsError {
    #[error("not a TDMS file: {0}")]
    NotTdms(String),

    #[error("corrupt TDMS segment: {0}")]
    Corrupt(String),

    #[error("unsupported TDMS feature: {0}")]
    Unsupported(String),

    #[error("unknown TDMS data type code 0x{0:08X}")]
    UnknownDataType(u32),

    #[error("invalid object path {0:?}")]
    InvalidPath(String),

    #[error("invalid UTF-8 in TDMS string: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// TDMS on-disk data types
///
/// The with-unit floating point variants (0x19/0x1A) are folded into their
/// plain counterparts; the unit lives in the `unit_string` property anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Metadata-only object, no raw data seen yet
    Void,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Bool,
    /// 128-bit NI timestamp (1904 epoch seconds + 2^-64 fractions)
    Timestamp,
}

impl DataType {
    /// Map a raw type code from the file to a DataType
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0x00 => Ok(DataType::Void),
            0x01 => Ok(DataType::I8),
            0x02 => Ok(DataType::I16),
            0x03 => Ok(DataType::I32),
            0x04 => Ok(DataType::I64),
            0x05 => Ok(DataType::U8),
            0x06 => Ok(DataType::U16),
            0x07 => Ok(DataType::U32),
            0x08 => Ok(DataType::U64),
            0x09 | 0x19 => Ok(DataType::F32),
            0x0A | 0x1A => Ok(DataType::F64),
            0x20 => Ok(DataType::String),
            0x21 => Ok(DataType::Bool),
            0x44 => Ok(DataType::Timestamp),
            other => Err(TdmsError::UnknownDataType(other)),
        }
    }

    /// Size of one value on disk, None for variable-length types
    pub fn size(&self) -> Option<usize> {
        match self {
            DataType::Void => None,
            DataType::I8 | DataType::U8 | DataType::Bool => Some(1),
            DataType::I16 | DataType::U16 => Some(2),
            DataType::I32 | DataType::U32 | DataType::F32 => Some(4),
            DataType::I64 | DataType::U64 | DataType::F64 => Some(8),
            DataType::String => None,
            DataType::Timestamp => Some(16),
        }
    }

    /// True if channel values of this type can be widened to f64
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Void | DataType::String | DataType::Timestamp)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Void => "void",
            DataType::I8 => "i8",
            DataType::I16 => "i16",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
            DataType::U8 => "u8",
            DataType::U16 => "u16",
            DataType::U32 => "u32",
            DataType::U64 => "u64",
            DataType::F32 => "f32",
            DataType::F64 => "f64",
            DataType::String => "string",
            DataType::Bool => "bool",
            DataType::Timestamp => "timestamp",
        };
        write!(f, "{}", name)
    }
}

/// A property value attached to the file, a group, or a channel
///
/// Properties are passed through opaquely; the converter only ever inspects
/// a handful of well-known waveform keys (`wf_increment`, `wf_start_time`, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    String(String),
    Timestamp(Timestamp),
}

impl PropertyValue {
    /// Convert the value to f64 if it is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(v) => Some(*v as f64),
            PropertyValue::Uint(v) => Some(*v as f64),
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the value as a string if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a timestamp if it is one
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            PropertyValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Uint(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::String(v) => write!(f, "{}", v),
            PropertyValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// Ordered property list with upsert semantics
///
/// TDMS metadata can restate a property in a later segment; the last value
/// wins but the original position is kept so rendered output stays stable.
pub(crate) fn upsert_property(
    properties: &mut Vec<(String, PropertyValue)>,
    name: String,
    value: PropertyValue,
) {
    match properties.iter_mut().find(|(n, _)| *n == name) {
        Some((_, v)) => *v = value,
        None => properties.push((name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_codes() {
        assert_eq!(DataType::from_code(0x0A).unwrap(), DataType::F64);
        assert_eq!(DataType::from_code(0x1A).unwrap(), DataType::F64);
        assert_eq!(DataType::from_code(0x03).unwrap(), DataType::I32);
        assert_eq!(DataType::from_code(0x44).unwrap(), DataType::Timestamp);
        assert!(matches!(
            DataType::from_code(0xDEAD),
            Err(TdmsError::UnknownDataType(0xDEAD))
        ));
    }

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::F64.size(), Some(8));
        assert_eq!(DataType::U16.size(), Some(2));
        assert_eq!(DataType::Bool.size(), Some(1));
        assert_eq!(DataType::String.size(), None);
        assert!(DataType::F32.is_numeric());
        assert!(!DataType::String.is_numeric());
    }

    #[test]
    fn test_property_value_accessors() {
        assert_eq!(PropertyValue::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(PropertyValue::Int(-3).as_f64(), Some(-3.0));
        assert_eq!(PropertyValue::String("V".into()).as_str(), Some("V"));
        assert_eq!(PropertyValue::String("V".into()).as_f64(), None);
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut props = Vec::new();
        upsert_property(&mut props, "a".into(), PropertyValue::Int(1));
        upsert_property(&mut props, "b".into(), PropertyValue::Int(2));
        upsert_property(&mut props, "a".into(), PropertyValue::Int(3));
        assert_eq!(props.len(), 2);
        assert_eq!(props[0], ("a".into(), PropertyValue::Int(3)));
    }
}
