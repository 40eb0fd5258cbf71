//! Array assembly
//!
//! Reads the selected channels of a source file into a uniform tabular form
//! and assigns each column an output label: the user-supplied name when one
//! was given, else the channel's metadata name, else a positional fallback.
//! Optionally prepends a time track synthesized from the source's declared
//! sampling interval.

use crate::error::{ConvertError, Result};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use tdms_decoder::TdmsFile;

/// Label used for the time column when the naming plan does not cover it
pub const TIME_LABEL: &str = "time";

/// One assembled output column
#[derive(Debug, Clone)]
pub struct Column {
    pub label: String,
    pub samples: Array1<f64>,
    /// Recording start time of the originating channel, if declared
    pub start_time: Option<DateTime<Utc>>,
}

/// The assembled output of one source file
#[derive(Debug, Clone)]
pub struct AssembledTable {
    pub columns: Vec<Column>,
}

impl AssembledTable {
    /// Column labels in output order
    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// Recording start time of the first column that declares one
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.columns.iter().find_map(|c| c.start_time)
    }

    /// Collapse the columns into one rectangular matrix (rows x columns)
    ///
    /// Fails with `ShapeMismatch` when the columns are ragged; formats that
    /// tolerate per-channel lengths write the columns directly instead.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let rows = self.columns.first().map(|c| c.samples.len()).unwrap_or(0);
        for column in &self.columns {
            if column.samples.len() != rows {
                return Err(ConvertError::ShapeMismatch {
                    label: column.label.clone(),
                    expected: rows,
                    actual: column.samples.len(),
                });
            }
        }
        let mut matrix = Array2::zeros((rows, self.columns.len()));
        for (j, column) in self.columns.iter().enumerate() {
            matrix.column_mut(j).assign(&column.samples);
        }
        Ok(matrix)
    }
}

/// Assemble the selected channels of `file` into labeled columns
///
/// `selection` holds validated indices into the first group's channel list
/// (see [`crate::select::select`]); `names` is the user's naming plan, which
/// reserves its first slot for the time track when `time_track` is set.
pub fn assemble(
    file: &TdmsFile,
    selection: &[usize],
    names: &[String],
    time_track: bool,
) -> Result<AssembledTable> {
    let channels = file
        .first_group()
        .map(|g| g.channels.as_slice())
        .unwrap_or(&[]);

    // Re-check bounds so library callers bypassing select() still get a
    // typed error instead of a panic
    for &index in selection {
        if index >= channels.len() {
            return Err(ConvertError::OutOfRange {
                index,
                count: channels.len(),
            });
        }
    }

    if !names.is_empty() {
        let expected = selection.len() + usize::from(time_track);
        if names.len() != expected {
            return Err(ConvertError::Configuration(format!(
                "{} channel names given but {} selected channels need {}",
                names.len(),
                selection.len(),
                expected
            )));
        }
    }

    let mut columns = Vec::with_capacity(selection.len() + 1);
    let mut name_offset = 0;

    if time_track {
        // Names reserve the time slot whenever a track was requested, even
        // if the source turns out not to declare a sampling interval
        name_offset = usize::from(!names.is_empty());
        let first = selection.first().map(|&i| &channels[i]);
        match first.and_then(|ch| ch.increment().map(|inc| (ch, inc))) {
            Some((ch, increment)) => {
                let offset = ch.start_offset().unwrap_or(0.0);
                let track: Vec<f64> = (0..ch.len())
                    .map(|i| offset + i as f64 * increment)
                    .collect();
                let samples = Array1::from(track);
                let label = names
                    .first()
                    .filter(|n| !n.is_empty())
                    .cloned()
                    .unwrap_or_else(|| TIME_LABEL.to_string());
                columns.push(Column {
                    label,
                    samples,
                    start_time: ch.start_time(),
                });
            }
            None => {
                log::warn!("time track requested but the source declares no sampling interval, skipping");
            }
        }
    }

    for (n, &index) in selection.iter().enumerate() {
        let channel = &channels[index];
        let label = names
            .get(n + name_offset)
            .filter(|name| !name.is_empty())
            .cloned()
            .unwrap_or_else(|| {
                if channel.name.is_empty() {
                    format!("channel_{}", index)
                } else {
                    channel.name.clone()
                }
            });
        columns.push(Column {
            label,
            samples: Array1::from(channel.data.clone()),
            start_time: channel.start_time(),
        });
    }

    Ok(AssembledTable { columns })
}
