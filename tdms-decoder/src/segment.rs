//! Low-level TDMS segment primitives
//!
//! Each TDMS file is a sequence of segments. A segment starts with a 28-byte
//! lead-in ("TDSm" tag, table-of-contents bitmask, version, offsets),
//! optionally followed by a metadata block (object paths, raw-data indexes,
//! properties) and a raw-data block.
//!
//! ## Supported
//! - Little-endian segments (the LabVIEW default)
//! - Contiguous raw data, including repeated chunks within one segment
//! - Incremental metadata across segments ("same as previous" indexes)
//!
//! ## Rejected with `TdmsError::Unsupported`
//! - Big-endian segments
//! - DAQmx raw data
//! - Interleaved raw data
//! - String or timestamp channel data

use crate::types::{DataType, PropertyValue, Result, TdmsError, Timestamp};
use byteorder::{ReadBytesExt, LE};
use chrono::DateTime;
use std::io::Cursor;

/// Segment lead-in length on disk
pub(crate) const LEAD_IN_LEN: u64 = 28;

/// Magic tag at the start of every segment
pub(crate) const SEGMENT_TAG: [u8; 4] = *b"TDSm";

/// Sentinel next-segment offset written when a recording was cut off mid-segment
pub(crate) const INCOMPLETE_SEGMENT: u64 = u64::MAX;

/// Table-of-contents flags from the segment lead-in
pub(crate) mod toc {
    pub const META_DATA: u32 = 1 << 1;
    pub const NEW_OBJ_LIST: u32 = 1 << 2;
    pub const RAW_DATA: u32 = 1 << 3;
    pub const INTERLEAVED_DATA: u32 = 1 << 5;
    pub const BIG_ENDIAN: u32 = 1 << 6;
    pub const DAQMX_RAW_DATA: u32 = 1 << 7;
}

/// Parsed segment lead-in
#[derive(Debug, Clone, Copy)]
pub(crate) struct LeadIn {
    pub toc: u32,
    pub version: u32,
    /// Offset from the end of the lead-in to the next segment
    pub next_segment_offset: u64,
    /// Offset from the end of the lead-in to the raw data block
    pub raw_data_offset: u64,
}

/// Raw-data index entry for one object in a metadata block
#[derive(Debug, Clone, Copy)]
pub(crate) enum RawIndexEntry {
    /// 0xFFFFFFFF - this object has no raw data in this segment
    None,
    /// 0x00000000 - reuse the index from the previous segment
    MatchPrevious,
    /// A full index: data type and value count per chunk
    Index(RawIndex),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RawIndex {
    pub data_type: DataType,
    pub n_values: u64,
}

/// Read and validate a segment lead-in
pub(crate) fn read_lead_in(cursor: &mut Cursor<&[u8]>) -> Result<LeadIn> {
    let mut tag = [0u8; 4];
    std::io::Read::read_exact(cursor, &mut tag)?;
    if tag != SEGMENT_TAG {
        return Err(TdmsError::NotTdms(format!(
            "bad segment tag {:02X?} at offset {}",
            tag,
            cursor.position() - 4
        )));
    }

    let toc = cursor.read_u32::<LE>()?;
    let version = cursor.read_u32::<LE>()?;
    let next_segment_offset = cursor.read_u64::<LE>()?;
    let raw_data_offset = cursor.read_u64::<LE>()?;

    if toc & toc::BIG_ENDIAN != 0 {
        return Err(TdmsError::Unsupported("big-endian segment".into()));
    }
    if toc & toc::DAQMX_RAW_DATA != 0 {
        return Err(TdmsError::Unsupported("DAQmx raw data".into()));
    }
    if toc & toc::INTERLEAVED_DATA != 0 {
        return Err(TdmsError::Unsupported("interleaved raw data".into()));
    }
    if version != 4712 && version != 4713 {
        log::warn!("unexpected TDMS version {}, continuing anyway", version);
    }

    Ok(LeadIn {
        toc,
        version,
        next_segment_offset,
        raw_data_offset,
    })
}

/// Read a length-prefixed UTF-8 string
pub(crate) fn read_string(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let len = cursor.read_u32::<LE>()? as usize;
    let mut buf = vec![0u8; len];
    std::io::Read::read_exact(cursor, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Read a 128-bit NI timestamp (little-endian: fractions first, then seconds)
pub(crate) fn read_timestamp(cursor: &mut Cursor<&[u8]>) -> Result<Timestamp> {
    let fractions = cursor.read_u64::<LE>()?;
    let seconds = cursor.read_i64::<LE>()?;
    Ok(ni_timestamp(seconds, fractions))
}

/// Seconds offset between the NI 1904 epoch and the Unix 1970 epoch
const EPOCH_1904_UNIX: i64 = -2_082_844_800;

/// Convert an NI timestamp (1904 epoch seconds + 2^-64 second fractions) to UTC
pub(crate) fn ni_timestamp(seconds: i64, fractions: u64) -> Timestamp {
    let unix_seconds = seconds.saturating_add(EPOCH_1904_UNIX);
    let nanos = ((fractions as u128 * 1_000_000_000u128) >> 64) as u32;
    DateTime::from_timestamp(unix_seconds, nanos).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Read one property value of the given type
pub(crate) fn read_property_value(
    cursor: &mut Cursor<&[u8]>,
    data_type: DataType,
) -> Result<PropertyValue> {
    match data_type {
        DataType::I8 => Ok(PropertyValue::Int(cursor.read_i8()? as i64)),
        DataType::I16 => Ok(PropertyValue::Int(cursor.read_i16::<LE>()? as i64)),
        DataType::I32 => Ok(PropertyValue::Int(cursor.read_i32::<LE>()? as i64)),
        DataType::I64 => Ok(PropertyValue::Int(cursor.read_i64::<LE>()?)),
        DataType::U8 => Ok(PropertyValue::Uint(cursor.read_u8()? as u64)),
        DataType::U16 => Ok(PropertyValue::Uint(cursor.read_u16::<LE>()? as u64)),
        DataType::U32 => Ok(PropertyValue::Uint(cursor.read_u32::<LE>()? as u64)),
        DataType::U64 => Ok(PropertyValue::Uint(cursor.read_u64::<LE>()?)),
        DataType::F32 => Ok(PropertyValue::Float(cursor.read_f32::<LE>()? as f64)),
        DataType::F64 => Ok(PropertyValue::Float(cursor.read_f64::<LE>()?)),
        DataType::Bool => Ok(PropertyValue::Bool(cursor.read_u8()? != 0)),
        DataType::String => Ok(PropertyValue::String(read_string(cursor)?)),
        DataType::Timestamp => Ok(PropertyValue::Timestamp(read_timestamp(cursor)?)),
        DataType::Void => Err(TdmsError::Corrupt("void-typed property".into())),
    }
}

/// Read one named property (name, type code, value)
pub(crate) fn read_property(cursor: &mut Cursor<&[u8]>) -> Result<(String, PropertyValue)> {
    let name = read_string(cursor)?;
    let type_code = cursor.read_u32::<LE>()?;
    let data_type = DataType::from_code(type_code)?;
    let value = read_property_value(cursor, data_type)?;
    Ok((name, value))
}

/// Read an object's raw-data index
pub(crate) fn read_raw_index(cursor: &mut Cursor<&[u8]>) -> Result<RawIndexEntry> {
    let header = cursor.read_u32::<LE>()?;
    match header {
        0xFFFF_FFFF => Ok(RawIndexEntry::None),
        0x0000_0000 => Ok(RawIndexEntry::MatchPrevious),
        0x6912_0000 | 0x6913_0000 => Err(TdmsError::Unsupported("DAQmx raw data index".into())),
        _ => {
            // `header` is the index length in bytes; the fields below are fixed
            let type_code = cursor.read_u32::<LE>()?;
            let data_type = DataType::from_code(type_code)?;
            let dimension = cursor.read_u32::<LE>()?;
            if dimension != 1 {
                return Err(TdmsError::Unsupported(format!(
                    "raw data with dimension {}",
                    dimension
                )));
            }
            let n_values = cursor.read_u64::<LE>()?;
            if data_type == DataType::String {
                // Strings carry an extra total-size field and cannot be
                // widened to f64 anyway
                return Err(TdmsError::Unsupported("string channel data".into()));
            }
            if !data_type.is_numeric() && data_type != DataType::Bool {
                return Err(TdmsError::Unsupported(format!(
                    "{} channel data",
                    data_type
                )));
            }
            Ok(RawIndexEntry::Index(RawIndex { data_type, n_values }))
        }
    }
}

/// Read one raw channel value and widen it to f64
pub(crate) fn read_value_as_f64(cursor: &mut Cursor<&[u8]>, data_type: DataType) -> Result<f64> {
    match data_type {
        DataType::I8 => Ok(cursor.read_i8()? as f64),
        DataType::I16 => Ok(cursor.read_i16::<LE>()? as f64),
        DataType::I32 => Ok(cursor.read_i32::<LE>()? as f64),
        DataType::I64 => Ok(cursor.read_i64::<LE>()? as f64),
        DataType::U8 => Ok(cursor.read_u8()? as f64),
        DataType::U16 => Ok(cursor.read_u16::<LE>()? as f64),
        DataType::U32 => Ok(cursor.read_u32::<LE>()? as f64),
        DataType::U64 => Ok(cursor.read_u64::<LE>()? as f64),
        DataType::F32 => Ok(cursor.read_f32::<LE>()? as f64),
        DataType::F64 => Ok(cursor.read_f64::<LE>()?),
        DataType::Bool => Ok(if cursor.read_u8()? != 0 { 1.0 } else { 0.0 }),
        other => Err(TdmsError::Unsupported(format!("{} channel data", other))),
    }
}

/// Split a TDMS object path into its components
///
/// Paths look like `/` (file), `/'Group'` (group), or `/'Group'/'Channel'`;
/// a quote inside a name is escaped by doubling it.
pub(crate) fn parse_object_path(path: &str) -> Result<Vec<String>> {
    let bytes: Vec<char> = path.chars().collect();
    let mut parts = Vec::new();
    let mut pos = 0;

    if bytes.is_empty() || bytes[0] != '/' {
        return Err(TdmsError::InvalidPath(path.to_string()));
    }
    pos += 1;
    if pos == bytes.len() {
        return Ok(parts); // root object
    }

    loop {
        if bytes.get(pos) != Some(&'\'') {
            return Err(TdmsError::InvalidPath(path.to_string()));
        }
        pos += 1;
        let mut name = String::new();
        loop {
            match bytes.get(pos) {
                Some('\'') if bytes.get(pos + 1) == Some(&'\'') => {
                    name.push('\'');
                    pos += 2;
                }
                Some('\'') => {
                    pos += 1;
                    break;
                }
                Some(c) => {
                    name.push(*c);
                    pos += 1;
                }
                None => return Err(TdmsError::InvalidPath(path.to_string())),
            }
        }
        parts.push(name);
        match bytes.get(pos) {
            None => return Ok(parts),
            Some('/') => pos += 1,
            Some(_) => return Err(TdmsError::InvalidPath(path.to_string())),
        }
    }
}
