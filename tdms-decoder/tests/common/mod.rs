//! Synthetic TDMS segment builder for tests
//!
//! Builds byte-exact segments (lead-in + metadata + raw data) so the reader
//! can be exercised without binary fixture files.

use byteorder::{WriteBytesExt, LE};

pub const TOC_META_DATA: u32 = 1 << 1;
pub const TOC_NEW_OBJ_LIST: u32 = 1 << 2;
pub const TOC_RAW_DATA: u32 = 1 << 3;
pub const TOC_BIG_ENDIAN: u32 = 1 << 6;

/// Raw-data index of one object in a metadata block
pub enum IndexSpec {
    /// 0xFFFFFFFF - no raw data
    NoRaw,
    /// 0x00000000 - same layout as the previous segment
    Prev,
    /// Full index: f64 data with the given per-chunk value count
    F64(u64),
    /// Full index: i32 data with the given per-chunk value count
    I32(u64),
}

pub enum PropSpec {
    F64(f64),
    I32(i32),
    Str(String),
    /// NI timestamp: 1904-epoch seconds + 2^-64 fractions
    Time(i64, u64),
}

pub struct ObjSpec {
    pub path: String,
    pub index: IndexSpec,
    pub props: Vec<(String, PropSpec)>,
}

impl ObjSpec {
    pub fn new(path: &str, index: IndexSpec) -> Self {
        Self {
            path: path.to_string(),
            index,
            props: Vec::new(),
        }
    }

    pub fn prop(mut self, name: &str, value: PropSpec) -> Self {
        self.props.push((name.to_string(), value));
        self
    }
}

fn push_string(buf: &mut Vec<u8>, s: &str) {
    buf.write_u32::<LE>(s.len() as u32).unwrap();
    buf.extend_from_slice(s.as_bytes());
}

fn metadata_block(objects: &[ObjSpec]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LE>(objects.len() as u32).unwrap();
    for obj in objects {
        push_string(&mut buf, &obj.path);
        match &obj.index {
            IndexSpec::NoRaw => buf.write_u32::<LE>(0xFFFF_FFFF).unwrap(),
            IndexSpec::Prev => buf.write_u32::<LE>(0x0000_0000).unwrap(),
            IndexSpec::F64(count) => {
                buf.write_u32::<LE>(20).unwrap(); // index length
                buf.write_u32::<LE>(0x0A).unwrap(); // f64
                buf.write_u32::<LE>(1).unwrap(); // dimension
                buf.write_u64::<LE>(*count).unwrap();
            }
            IndexSpec::I32(count) => {
                buf.write_u32::<LE>(20).unwrap();
                buf.write_u32::<LE>(0x03).unwrap(); // i32
                buf.write_u32::<LE>(1).unwrap();
                buf.write_u64::<LE>(*count).unwrap();
            }
        }
        buf.write_u32::<LE>(obj.props.len() as u32).unwrap();
        for (name, value) in &obj.props {
            push_string(&mut buf, name);
            match value {
                PropSpec::F64(v) => {
                    buf.write_u32::<LE>(0x0A).unwrap();
                    buf.write_f64::<LE>(*v).unwrap();
                }
                PropSpec::I32(v) => {
                    buf.write_u32::<LE>(0x03).unwrap();
                    buf.write_i32::<LE>(*v).unwrap();
                }
                PropSpec::Str(v) => {
                    buf.write_u32::<LE>(0x20).unwrap();
                    push_string(&mut buf, v);
                }
                PropSpec::Time(seconds, fractions) => {
                    buf.write_u32::<LE>(0x44).unwrap();
                    buf.write_u64::<LE>(*fractions).unwrap();
                    buf.write_i64::<LE>(*seconds).unwrap();
                }
            }
        }
    }
    buf
}

/// Assemble one segment from explicit parts
pub fn segment(toc: u32, metadata: &[u8], raw: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"TDSm");
    buf.write_u32::<LE>(toc).unwrap();
    buf.write_u32::<LE>(4713).unwrap();
    buf.write_u64::<LE>((metadata.len() + raw.len()) as u64)
        .unwrap();
    buf.write_u64::<LE>(metadata.len() as u64).unwrap();
    buf.extend_from_slice(metadata);
    buf.extend_from_slice(raw);
    buf
}

/// Segment with metadata objects and a raw block
pub fn meta_segment(objects: &[ObjSpec], raw: &[u8], new_obj_list: bool) -> Vec<u8> {
    let mut toc = TOC_META_DATA;
    if new_obj_list {
        toc |= TOC_NEW_OBJ_LIST;
    }
    if !raw.is_empty() {
        toc |= TOC_RAW_DATA;
    }
    segment(toc, &metadata_block(objects), raw)
}

/// Raw-only continuation segment (keeps the previous object list)
pub fn raw_segment(raw: &[u8]) -> Vec<u8> {
    segment(TOC_RAW_DATA, &[], raw)
}

pub fn f64_bytes(values: &[f64]) -> Vec<u8> {
    let mut buf = Vec::new();
    for v in values {
        buf.write_f64::<LE>(*v).unwrap();
    }
    buf
}

pub fn i32_bytes(values: &[i32]) -> Vec<u8> {
    let mut buf = Vec::new();
    for v in values {
        buf.write_i32::<LE>(*v).unwrap();
    }
    buf
}
