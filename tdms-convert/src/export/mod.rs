//! Output dispatch
//!
//! Maps the configured output format to its serializer and composes
//! destination filenames from the source base name, the recording timestamp,
//! and (in split mode) the channel label:
//!
//! `<base>[_<YYYYmmdd-HHMMSS>][_<label>].<extension>`
//!
//! Distinct sources that compose identical filenames overwrite each other;
//! last write wins, as with any same-named write.

use crate::assemble::{AssembledTable, Column};
use crate::config::{ExportConfig, OutputFormat};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

mod mat;
mod npy;
mod table;
mod wav;

/// Naming inputs derived from one source file
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Source file name without extension
    pub base_name: String,
    /// Directory output files are written into
    pub directory: PathBuf,
    /// Recording start time of the source, if its metadata declares one
    pub recording_time: Option<DateTime<Utc>>,
}

impl SourceContext {
    /// Derive the naming inputs for `source`, honoring a configured
    /// destination directory
    pub fn new(
        source: &Path,
        output_dir: Option<&Path>,
        recording_time: Option<DateTime<Utc>>,
    ) -> Self {
        let base_name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let directory = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => source.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        Self {
            base_name,
            directory,
            recording_time,
        }
    }
}

/// Timestamp segment format used in composed filenames
fn timestamp_segment(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d-%H%M%S").to_string()
}

/// Path separators inside a label would split the composed filename
fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}

/// Compose one destination path
pub(crate) fn output_path(
    source: &SourceContext,
    label: Option<&str>,
    time: Option<DateTime<Utc>>,
    extension: &str,
) -> PathBuf {
    let mut name = source.base_name.clone();
    if let Some(time) = time {
        name.push('_');
        name.push_str(&timestamp_segment(time));
    }
    if let Some(label) = label {
        name.push('_');
        name.push_str(&sanitize_label(label));
    }
    name.push('.');
    name.push_str(extension);
    source.directory.join(name)
}

/// Timestamp used for one column's file in split mode: the channel's own
/// recording time, falling back to the source-level one
pub(crate) fn column_time(column: &Column, source: &SourceContext) -> Option<DateTime<Utc>> {
    column.start_time.or(source.recording_time)
}

/// Write the assembled table in the configured format
///
/// Returns the list of written paths. Creates the destination directory when
/// one is configured and absent.
pub fn write(
    table: &AssembledTable,
    config: &ExportConfig,
    source: &SourceContext,
) -> Result<Vec<PathBuf>> {
    if config.output_dir.is_some() {
        std::fs::create_dir_all(&source.directory)?;
    }

    let split = config.effective_split();
    if split && !config.split {
        log::debug!("{} output always writes one file per channel", config.format);
    }

    let paths = match config.format {
        OutputFormat::Npy => npy::write(table, config, source, split)?,
        OutputFormat::Mat => mat::write(table, config, source, split)?,
        OutputFormat::Wav => wav::write(table, config, source)?,
        OutputFormat::Csv => table::write(table, source, split)?,
    };

    for path in &paths {
        log::info!("wrote {:?}", path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context() -> SourceContext {
        SourceContext::new(
            Path::new("data/rig.tdms"),
            None,
            Some(Utc.with_ymd_and_hms(2020, 7, 8, 15, 30, 12).unwrap()),
        )
    }

    #[test]
    fn test_output_path_composition() {
        let ctx = context();
        assert_eq!(
            output_path(&ctx, None, ctx.recording_time, "npy"),
            Path::new("data/rig_20200708-153012.npy")
        );
        assert_eq!(
            output_path(&ctx, Some("voltage"), ctx.recording_time, "mat"),
            Path::new("data/rig_20200708-153012_voltage.mat")
        );
    }

    #[test]
    fn test_output_path_without_timestamp() {
        let ctx = SourceContext::new(Path::new("rig.tdms"), None, None);
        assert_eq!(output_path(&ctx, None, None, "csv"), Path::new("rig.csv"));
    }

    #[test]
    fn test_output_dir_overrides_source_directory() {
        let ctx = SourceContext::new(Path::new("data/rig.tdms"), Some(Path::new("out")), None);
        assert_eq!(
            output_path(&ctx, Some("a"), None, "wav"),
            Path::new("out/rig_a.wav")
        );
    }

    #[test]
    fn test_labels_with_separators_are_sanitized() {
        assert_eq!(sanitize_label("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_label("plain"), "plain");
    }
}
