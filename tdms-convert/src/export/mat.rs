//! MATLAB Level-5 MAT output
//!
//! Writes each column as a named f64 column-vector variable. No registry
//! crate writes the MAT5 container, so the serialization lives here: a
//! 128-byte header followed by one data element per variable. Compression
//! wraps each variable in a zlib `miCOMPRESSED` element, which is the same
//! per-variable scheme MATLAB's own `-v7` files use.

use super::{column_time, output_path, SourceContext};
use crate::assemble::{AssembledTable, Column};
use crate::config::ExportConfig;
use crate::error::Result;
use byteorder::{WriteBytesExt, LE};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;
const MX_DOUBLE_CLASS: u32 = 6;

/// MATLAB identifier length limit
const MAX_NAME_LEN: usize = 63;

pub fn write(
    table: &AssembledTable,
    config: &ExportConfig,
    source: &SourceContext,
    split: bool,
) -> Result<Vec<PathBuf>> {
    let extension = config.format.extension(config.compress);
    let mut paths = Vec::new();

    if split {
        for column in &table.columns {
            let path = output_path(
                source,
                Some(&column.label),
                column_time(column, source),
                extension,
            );
            let mut out = BufWriter::new(File::create(&path)?);
            write_header(&mut out)?;
            write_variable(&mut out, column, config.compress)?;
            out.flush()?;
            paths.push(path);
        }
    } else {
        let path = output_path(source, None, source.recording_time, extension);
        let mut out = BufWriter::new(File::create(&path)?);
        write_header(&mut out)?;
        for column in &table.columns {
            write_variable(&mut out, column, config.compress)?;
        }
        out.flush()?;
        paths.push(path);
    }

    Ok(paths)
}

/// 128-byte MAT5 header: description text, subsystem offset, version,
/// little-endian indicator
fn write_header<W: Write>(out: &mut W) -> io::Result<()> {
    let mut header = [b' '; 128];
    let text = format!(
        "MATLAB 5.0 MAT-file, created by tdms-convert {}",
        env!("CARGO_PKG_VERSION")
    );
    let len = text.len().min(116);
    header[..len].copy_from_slice(&text.as_bytes()[..len]);
    // Subsystem data offset: zero when unused
    header[116..124].fill(0);
    // Version 0x0100, then "IM" marking little-endian byte order
    header[124] = 0x00;
    header[125] = 0x01;
    header[126] = b'I';
    header[127] = b'M';
    out.write_all(&header)
}

/// Map a label to a valid MATLAB variable name
fn sanitize_name(label: &str) -> String {
    let mut name: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'x');
    }
    name.truncate(MAX_NAME_LEN);
    name
}

/// Encode one column as a complete `miMATRIX` element (tag included)
fn matrix_element(column: &Column) -> io::Result<Vec<u8>> {
    let samples = &column.samples;
    let name = sanitize_name(&column.label);

    let mut body = Vec::new();
    // Array flags subelement: mxDOUBLE class, no complex/global/logical bits
    body.write_u32::<LE>(MI_UINT32)?;
    body.write_u32::<LE>(8)?;
    body.write_u32::<LE>(MX_DOUBLE_CLASS)?;
    body.write_u32::<LE>(0)?;
    // Dimensions subelement: column vector
    body.write_u32::<LE>(MI_INT32)?;
    body.write_u32::<LE>(8)?;
    body.write_i32::<LE>(samples.len() as i32)?;
    body.write_i32::<LE>(1)?;
    // Name subelement, padded to the 8-byte boundary
    body.write_u32::<LE>(MI_INT8)?;
    body.write_u32::<LE>(name.len() as u32)?;
    body.extend_from_slice(name.as_bytes());
    while body.len() % 8 != 0 {
        body.push(0);
    }
    // Real part subelement: f64 samples, already 8-byte aligned
    body.write_u32::<LE>(MI_DOUBLE)?;
    body.write_u32::<LE>((samples.len() * 8) as u32)?;
    for value in samples {
        body.write_f64::<LE>(*value)?;
    }

    let mut element = Vec::with_capacity(body.len() + 8);
    element.write_u32::<LE>(MI_MATRIX)?;
    element.write_u32::<LE>(body.len() as u32)?;
    element.extend_from_slice(&body);
    Ok(element)
}

/// Write one variable, optionally wrapped in a zlib `miCOMPRESSED` element
fn write_variable<W: Write>(out: &mut W, column: &Column, compress: bool) -> io::Result<()> {
    let element = matrix_element(column)?;
    if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&element)?;
        let compressed = encoder.finish()?;
        out.write_u32::<LE>(MI_COMPRESSED)?;
        out.write_u32::<LE>(compressed.len() as u32)?;
        out.write_all(&compressed)?;
    } else {
        out.write_all(&element)?;
    }
    Ok(())
}
