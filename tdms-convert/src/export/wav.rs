//! WAV audio output
//!
//! WAV cannot hold multiple independently labeled channels in one stream,
//! so this writer always emits one mono file per channel, regardless of the
//! split flag. Each channel is peak-normalized on its own and encoded as
//! 16-bit PCM at the configured sampling rate.

use super::{column_time, output_path, SourceContext};
use crate::assemble::AssembledTable;
use crate::config::ExportConfig;
use crate::error::{ConvertError, Result};
use std::path::PathBuf;

pub fn write(
    table: &AssembledTable,
    config: &ExportConfig,
    source: &SourceContext,
) -> Result<Vec<PathBuf>> {
    // validate() catches this before any file is opened; this guards
    // library callers that skip validation
    let sample_rate = config.sample_rate.ok_or_else(|| {
        ConvertError::MissingParameter("wav output requires a sampling rate".into())
    })?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut paths = Vec::new();
    for column in &table.columns {
        let path = output_path(
            source,
            Some(&column.label),
            column_time(column, source),
            config.format.extension(false),
        );
        let mut writer = hound::WavWriter::create(&path, spec)
            .map_err(|e| ConvertError::Write(e.to_string()))?;

        let peak = column.samples.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        let scale = if peak > 0.0 {
            f64::from(i16::MAX) / peak
        } else {
            0.0
        };
        for &value in &column.samples {
            let sample = (value * scale)
                .round()
                .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
            writer
                .write_sample(sample)
                .map_err(|e| ConvertError::Write(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| ConvertError::Write(e.to_string()))?;
        paths.push(path);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Column;
    use ndarray::Array1;
    use std::path::Path;

    #[test]
    fn test_channels_are_normalized_independently() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceContext::new(&dir.path().join("rig.tdms"), None, None);
        let config = ExportConfig::new(crate::config::OutputFormat::Wav).with_sample_rate(8_000);
        let table = AssembledTable {
            columns: vec![
                Column {
                    label: "loud".into(),
                    samples: Array1::from(vec![0.0, 4.0, -4.0]),
                    start_time: None,
                },
                Column {
                    label: "quiet".into(),
                    samples: Array1::from(vec![0.0, 0.5, -0.5]),
                    start_time: None,
                },
            ],
        };

        let paths = write(&table, &config, &source).unwrap();
        assert_eq!(paths.len(), 2);

        for path in &paths {
            let mut reader = hound::WavReader::open(path).unwrap();
            assert_eq!(reader.spec().sample_rate, 8_000);
            let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
            // Both channels peak at full scale after normalization
            assert_eq!(samples, vec![0, i16::MAX, -i16::MAX]);
        }
    }

    #[test]
    fn test_silent_channel_stays_silent() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceContext::new(&dir.path().join("rig.tdms"), None, None);
        let config = ExportConfig::new(crate::config::OutputFormat::Wav).with_sample_rate(8_000);
        let table = AssembledTable {
            columns: vec![Column {
                label: "flat".into(),
                samples: Array1::from(vec![0.0; 4]),
                start_time: None,
            }],
        };

        let paths = write(&table, &config, &source).unwrap();
        let mut reader = hound::WavReader::open(&paths[0]).unwrap();
        assert!(reader.samples::<i16>().all(|s| s.unwrap() == 0));
    }

    #[test]
    fn test_missing_rate_is_rejected() {
        let source = SourceContext::new(Path::new("rig.tdms"), None, None);
        let config = ExportConfig::new(crate::config::OutputFormat::Wav);
        let table = AssembledTable { columns: vec![] };
        assert!(matches!(
            write(&table, &config, &source),
            Err(ConvertError::MissingParameter(_))
        ));
    }
}
