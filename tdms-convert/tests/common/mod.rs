//! Synthetic TDMS sources for pipeline tests
//!
//! Builds minimal single-segment TDMS files (lead-in + metadata + raw data)
//! so the whole conversion pipeline can run against real bytes on disk
//! without binary fixtures.

use byteorder::{WriteBytesExt, LE};
use std::path::{Path, PathBuf};

const TOC_META_DATA: u32 = 1 << 1;
const TOC_NEW_OBJ_LIST: u32 = 1 << 2;
const TOC_RAW_DATA: u32 = 1 << 3;

/// 2020-07-08T15:30:12Z in 1904-epoch seconds; filenames derived from it
/// carry the segment `20200708-153012`
pub const START_1904_SECONDS: i64 = 3_677_067_012;

fn push_string(buf: &mut Vec<u8>, s: &str) {
    buf.write_u32::<LE>(s.len() as u32).unwrap();
    buf.extend_from_slice(s.as_bytes());
}

fn push_f64_prop(buf: &mut Vec<u8>, name: &str, value: f64) {
    push_string(buf, name);
    buf.write_u32::<LE>(0x0A).unwrap();
    buf.write_f64::<LE>(value).unwrap();
}

fn push_time_prop(buf: &mut Vec<u8>, name: &str, seconds_1904: i64) {
    push_string(buf, name);
    buf.write_u32::<LE>(0x44).unwrap();
    buf.write_u64::<LE>(0).unwrap(); // fractions
    buf.write_i64::<LE>(seconds_1904).unwrap();
}

/// Build a single-segment waveform file with f64 channels in one group
///
/// `increment` and `start_1904_seconds` attach `wf_increment` and
/// `wf_start_time` properties to every channel when given.
pub fn waveform_file(
    channels: &[(&str, Vec<f64>)],
    increment: Option<f64>,
    start_1904_seconds: Option<i64>,
) -> Vec<u8> {
    let mut metadata = Vec::new();
    metadata
        .write_u32::<LE>(1 + channels.len() as u32)
        .unwrap();

    // Group object
    push_string(&mut metadata, "/'group'");
    metadata.write_u32::<LE>(0xFFFF_FFFF).unwrap(); // no raw data
    metadata.write_u32::<LE>(0).unwrap(); // no properties

    for (name, data) in channels {
        push_string(&mut metadata, &format!("/'group'/'{}'", name));
        metadata.write_u32::<LE>(20).unwrap(); // raw index length
        metadata.write_u32::<LE>(0x0A).unwrap(); // f64
        metadata.write_u32::<LE>(1).unwrap(); // dimension
        metadata.write_u64::<LE>(data.len() as u64).unwrap();

        let n_props =
            u32::from(increment.is_some()) + u32::from(start_1904_seconds.is_some());
        metadata.write_u32::<LE>(n_props).unwrap();
        if let Some(inc) = increment {
            push_f64_prop(&mut metadata, "wf_increment", inc);
        }
        if let Some(seconds) = start_1904_seconds {
            push_time_prop(&mut metadata, "wf_start_time", seconds);
        }
    }

    let mut raw = Vec::new();
    for (_, data) in channels {
        for value in data {
            raw.write_f64::<LE>(*value).unwrap();
        }
    }

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"TDSm");
    bytes
        .write_u32::<LE>(TOC_META_DATA | TOC_NEW_OBJ_LIST | TOC_RAW_DATA)
        .unwrap();
    bytes.write_u32::<LE>(4713).unwrap();
    bytes
        .write_u64::<LE>((metadata.len() + raw.len()) as u64)
        .unwrap();
    bytes.write_u64::<LE>(metadata.len() as u64).unwrap();
    bytes.extend_from_slice(&metadata);
    bytes.extend_from_slice(&raw);
    bytes
}

/// Write source bytes to `<dir>/<name>` and return the path
pub fn write_source(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// A ramp of `len` samples starting at `start`
pub fn ramp(start: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| start + i as f64).collect()
}
