//! Main reader API
//!
//! `TdmsFile` is the entry point: it loads a whole recording into memory and
//! exposes file-, group-, and channel-level properties plus channel samples
//! widened to `f64`. Higher-level concerns (channel selection, relabeling,
//! output formats) belong to the application layer.

use crate::segment::{
    self, toc, LeadIn, RawIndex, RawIndexEntry, INCOMPLETE_SEGMENT, LEAD_IN_LEN,
};
use crate::types::{upsert_property, DataType, PropertyValue, Result, TdmsError, Timestamp};
use byteorder::{ReadBytesExt, LE};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// A fully read TDMS recording
#[derive(Debug, Clone, Default)]
pub struct TdmsFile {
    /// File-level properties from the root object, in file order
    pub properties: Vec<(String, PropertyValue)>,
    /// Groups in order of first appearance
    pub groups: Vec<Group>,
}

/// One group of channels
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub name: String,
    pub properties: Vec<(String, PropertyValue)>,
    /// Channels in order of first appearance
    pub channels: Vec<Channel>,
}

/// One recorded signal
#[derive(Debug, Clone)]
pub struct Channel {
    /// Name of the group this channel belongs to
    pub group: String,
    pub name: String,
    /// On-disk sample type (samples below are widened to f64)
    pub data_type: DataType,
    pub properties: Vec<(String, PropertyValue)>,
    pub data: Vec<f64>,
}

impl Channel {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Declared sampling interval in seconds (`wf_increment`)
    pub fn increment(&self) -> Option<f64> {
        self.property("wf_increment").and_then(|v| v.as_f64())
    }

    /// Offset of the first sample in seconds (`wf_start_offset`)
    pub fn start_offset(&self) -> Option<f64> {
        self.property("wf_start_offset").and_then(|v| v.as_f64())
    }

    /// Recording start time (`wf_start_time`)
    pub fn start_time(&self) -> Option<Timestamp> {
        self.property("wf_start_time").and_then(|v| v.as_timestamp())
    }

    /// Engineering unit (`unit_string`)
    pub fn unit(&self) -> Option<&str> {
        self.property("unit_string").and_then(|v| v.as_str())
    }
}

impl TdmsFile {
    /// Read a TDMS file from disk
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("Reading TDMS file: {:?}", path);
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a TDMS recording from a byte buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut parser = Parser::default();
        parser.parse(bytes)?;
        Ok(parser.finish())
    }

    /// Look up a file-level property by name
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The first group in the file
    ///
    /// Conversion targets a single group; multi-group files are handled by
    /// the metadata renderer only.
    pub fn first_group(&self) -> Option<&Group> {
        self.groups.first()
    }
}

/// Per-object parse state carried across segments
struct ObjectState {
    path: String,
    parts: Vec<String>,
    properties: Vec<(String, PropertyValue)>,
    /// Latest raw-data index seen for this object
    raw: Option<RawIndex>,
    data: Vec<f64>,
}

/// Incremental multi-segment parser
#[derive(Default)]
struct Parser {
    objects: Vec<ObjectState>,
    by_path: HashMap<String, usize>,
    /// Objects with raw data in the current segment layout, in data order
    active: Vec<usize>,
}

impl Parser {
    fn parse(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(TdmsError::NotTdms("empty file".into()));
        }

        let file_len = bytes.len() as u64;
        let mut pos = 0u64;
        let mut segment_no = 0usize;

        while pos < file_len {
            if file_len - pos < LEAD_IN_LEN {
                log::warn!(
                    "{} trailing bytes after last segment, ignoring",
                    file_len - pos
                );
                break;
            }

            let mut cursor = Cursor::new(bytes);
            cursor.set_position(pos);
            let lead_in = segment::read_lead_in(&mut cursor)?;
            segment_no += 1;
            log::debug!(
                "segment {} at offset {}: toc=0x{:X} version={}",
                segment_no,
                pos,
                lead_in.toc,
                lead_in.version
            );

            let data_start = pos + LEAD_IN_LEN + lead_in.raw_data_offset;
            let mut next_pos = if lead_in.next_segment_offset == INCOMPLETE_SEGMENT {
                // Recording was cut off mid-segment; data runs to EOF
                log::warn!("segment {} is incomplete, reading data to EOF", segment_no);
                file_len
            } else {
                pos + LEAD_IN_LEN + lead_in.next_segment_offset
            };
            if next_pos > file_len {
                log::warn!("segment {} is truncated, reading data to EOF", segment_no);
                next_pos = file_len;
            }
            if data_start > next_pos {
                return Err(TdmsError::Corrupt(format!(
                    "segment {}: raw data offset past segment end",
                    segment_no
                )));
            }

            if lead_in.toc & toc::META_DATA != 0 {
                self.read_metadata(&mut cursor, &lead_in)?;
            }

            if lead_in.toc & toc::RAW_DATA != 0 {
                cursor.set_position(data_start);
                self.read_raw_data(&mut cursor, next_pos - data_start, segment_no)?;
            }

            pos = next_pos;
        }

        Ok(())
    }

    /// Intern an object by path, returning its slot
    fn object_slot(&mut self, path: String) -> Result<usize> {
        if let Some(&slot) = self.by_path.get(&path) {
            return Ok(slot);
        }
        let parts = segment::parse_object_path(&path)?;
        let slot = self.objects.len();
        self.objects.push(ObjectState {
            path: path.clone(),
            parts,
            properties: Vec::new(),
            raw: None,
            data: Vec::new(),
        });
        self.by_path.insert(path, slot);
        Ok(slot)
    }

    fn read_metadata(&mut self, cursor: &mut Cursor<&[u8]>, lead_in: &LeadIn) -> Result<()> {
        let new_list = lead_in.toc & toc::NEW_OBJ_LIST != 0;
        if new_list {
            self.active.clear();
        }

        let n_objects = cursor.read_u32::<LE>()?;
        for _ in 0..n_objects {
            let path = segment::read_string(cursor)?;
            let slot = self.object_slot(path)?;

            match segment::read_raw_index(cursor)? {
                RawIndexEntry::None => {
                    // Property-only appearance; the object leaves the raw
                    // layout when a new object list is being built
                }
                RawIndexEntry::MatchPrevious => {
                    if self.objects[slot].raw.is_none() {
                        return Err(TdmsError::Corrupt(format!(
                            "object {:?} reuses a raw index it never had",
                            self.objects[slot].path
                        )));
                    }
                    self.activate(slot);
                }
                RawIndexEntry::Index(index) => {
                    self.objects[slot].raw = Some(index);
                    self.activate(slot);
                }
            }

            let n_properties = cursor.read_u32::<LE>()?;
            for _ in 0..n_properties {
                let (name, value) = segment::read_property(cursor)?;
                upsert_property(&mut self.objects[slot].properties, name, value);
            }
        }

        Ok(())
    }

    /// Add an object to the active raw layout, keeping its position if present
    fn activate(&mut self, slot: usize) {
        if !self.active.contains(&slot) {
            self.active.push(slot);
        }
    }

    fn read_raw_data(
        &mut self,
        cursor: &mut Cursor<&[u8]>,
        raw_len: u64,
        segment_no: usize,
    ) -> Result<()> {
        let mut chunk_size = 0u64;
        for &slot in &self.active {
            if let Some(raw) = self.objects[slot].raw {
                let value_size = raw.data_type.size().ok_or_else(|| {
                    TdmsError::Unsupported(format!("{} channel data", raw.data_type))
                })? as u64;
                chunk_size += raw.n_values * value_size;
            }
        }
        if chunk_size == 0 {
            return Ok(());
        }

        let n_chunks = raw_len / chunk_size;
        if raw_len % chunk_size != 0 {
            log::warn!(
                "segment {}: {} trailing raw bytes do not fill a chunk, ignoring",
                segment_no,
                raw_len % chunk_size
            );
        }

        let active = self.active.clone();
        for _ in 0..n_chunks {
            for &slot in &active {
                let Some(raw) = self.objects[slot].raw else {
                    continue;
                };
                let object = &mut self.objects[slot];
                object.data.reserve(raw.n_values as usize);
                for _ in 0..raw.n_values {
                    let value = segment::read_value_as_f64(cursor, raw.data_type)?;
                    object.data.push(value);
                }
            }
        }

        Ok(())
    }

    /// Assemble the per-object state into the public file structure
    fn finish(self) -> TdmsFile {
        let mut file = TdmsFile::default();
        let mut group_slots: HashMap<String, usize> = HashMap::new();

        for object in self.objects {
            match object.parts.len() {
                0 => {
                    file.properties = object.properties;
                }
                1 => {
                    let name = object.parts[0].clone();
                    let slot = *group_slots.entry(name.clone()).or_insert_with(|| {
                        file.groups.push(Group {
                            name,
                            ..Group::default()
                        });
                        file.groups.len() - 1
                    });
                    file.groups[slot].properties = object.properties;
                }
                _ => {
                    let group_name = object.parts[0].clone();
                    let slot = *group_slots.entry(group_name.clone()).or_insert_with(|| {
                        // Channels may appear before their group object
                        file.groups.push(Group {
                            name: group_name.clone(),
                            ..Group::default()
                        });
                        file.groups.len() - 1
                    });
                    file.groups[slot].channels.push(Channel {
                        group: group_name,
                        name: object.parts[1].clone(),
                        data_type: object
                            .raw
                            .map(|r| r.data_type)
                            .unwrap_or(DataType::Void),
                        properties: object.properties,
                        data: object.data,
                    });
                }
            }
        }

        file
    }
}
