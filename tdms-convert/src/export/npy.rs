//! NumPy array archive output
//!
//! Combined mode writes one rectangular 2-D `.npy` array, or a `.npz`
//! archive with one entry per label when compression is requested (npy
//! itself has no compressed variant). Split mode writes one 1-D array per
//! channel. The format carries no annotation slots, so labels only appear
//! as archive entry names and filename components.

use super::{column_time, output_path, SourceContext};
use crate::assemble::AssembledTable;
use crate::config::ExportConfig;
use crate::error::{ConvertError, Result};
use ndarray_npy::{write_npy, NpzWriter};
use std::fs::File;
use std::path::PathBuf;

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
            if config.compress {
                let mut npz = NpzWriter::new_compressed(File::create(&path)?);
                npz.add_array(column.label.as_str(), &column.samples)
                    .map_err(|e| ConvertError::Write(e.to_string()))?;
                npz.finish()
                    .map_err(|e| ConvertError::Write(e.to_string()))?;
            } else {
                write_npy(&path, &column.samples)
                    .map_err(|e| ConvertError::Write(e.to_string()))?;
            }
            paths.push(path);
        }
    } else {
        let path = output_path(source, None, source.recording_time, extension);
        if config.compress {
            let mut npz = NpzWriter::new_compressed(File::create(&path)?);
            for column in &table.columns {
                npz.add_array(column.label.as_str(), &column.samples)
                    .map_err(|e| ConvertError::Write(e.to_string()))?;
            }
            npz.finish()
                .map_err(|e| ConvertError::Write(e.to_string()))?;
        } else {
            let matrix = table.to_matrix()?;
            write_npy(&path, &matrix).map_err(|e| ConvertError::Write(e.to_string()))?;
        }
        paths.push(path);
    }

    Ok(paths)
}
