//! CSV text table output
//!
//! One header row of labels followed by one row per sample. Combined mode
//! needs rectangular data; split mode writes one single-column table per
//! channel. The compression flag is a documented no-op for this format
//! (a warning is logged during configuration validation).

use super::{column_time, output_path, SourceContext};
use crate::assemble::AssembledTable;
use crate::error::{ConvertError, Result};
use std::path::PathBuf;

const EXTENSION: &str = "csv";

pub fn write(
    table: &AssembledTable,
    source: &SourceContext,
    split: bool,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    if split {
        for column in &table.columns {
            let path = output_path(
                source,
                Some(&column.label),
                column_time(column, source),
                EXTENSION,
            );
            let mut writer = csv::Writer::from_path(&path)
                .map_err(|e| ConvertError::Write(e.to_string()))?;
            writer
                .write_record([column.label.as_str()])
                .map_err(|e| ConvertError::Write(e.to_string()))?;
            for value in &column.samples {
                writer
                    .write_record([format_value(*value)])
                    .map_err(|e| ConvertError::Write(e.to_string()))?;
            }
            writer.flush()?;
            paths.push(path);
        }
    } else {
        let matrix = table.to_matrix()?;
        let path = output_path(source, None, source.recording_time, EXTENSION);
        let mut writer =
            csv::Writer::from_path(&path).map_err(|e| ConvertError::Write(e.to_string()))?;
        writer
            .write_record(table.labels())
            .map_err(|e| ConvertError::Write(e.to_string()))?;
        for row in matrix.rows() {
            writer
                .write_record(row.iter().map(|v| format_value(*v)))
                .map_err(|e| ConvertError::Write(e.to_string()))?;
        }
        writer.flush()?;
        paths.push(path);
    }

    Ok(paths)
}

fn format_value(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Column;
    use ndarray::Array1;

    fn two_column_table() -> AssembledTable {
        AssembledTable {
            columns: vec![
                Column {
                    label: "a".into(),
                    samples: Array1::from(vec![1.0, 2.5]),
                    start_time: None,
                },
                Column {
                    label: "b".into(),
                    samples: Array1::from(vec![3.0, 4.0]),
                    start_time: None,
                },
            ],
        }
    }

    #[test]
    fn test_combined_table_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceContext::new(&dir.path().join("rig.tdms"), None, None);
        let paths = write(&two_column_table(), &source, false).unwrap();

        let text = std::fs::read_to_string(&paths[0]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["a,b", "1,3", "2.5,4"]);
    }

    #[test]
    fn test_split_writes_one_table_per_channel() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceContext::new(&dir.path().join("rig.tdms"), None, None);
        let paths = write(&two_column_table(), &source, true).unwrap();

        assert_eq!(paths.len(), 2);
        let text = std::fs::read_to_string(&paths[1]).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["b", "3", "4"]);
    }
}
