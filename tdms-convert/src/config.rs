//! Export configuration
//!
//! `ExportConfig` is the immutable value object driving one conversion run.
//! It is built once from command-line flags (optionally layered over a TOML
//! defaults file) or assembled directly by library callers, and validated
//! before any source file is opened.

use crate::error::{ConvertError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// NumPy array archive (.npy, or .npz when compressed)
    Npy,
    /// MATLAB Level-5 MAT file
    Mat,
    /// WAV audio, one file per channel
    Wav,
    /// CSV text table
    Csv,
}

impl OutputFormat {
    /// File extension for this format under the given compression setting
    pub fn extension(&self, compressed: bool) -> &'static str {
        match self {
            OutputFormat::Npy => {
                if compressed {
                    "npz"
                } else {
                    "npy"
                }
            }
            OutputFormat::Mat => "mat",
            OutputFormat::Wav => "wav",
            OutputFormat::Csv => "csv",
        }
    }

    /// Whether the compression flag changes the output for this format
    pub fn supports_compression(&self) -> bool {
        matches!(self, OutputFormat::Npy | OutputFormat::Mat)
    }

    /// WAV cannot hold multiple independently labeled channels in one stream
    pub fn forces_split(&self) -> bool {
        matches!(self, OutputFormat::Wav)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Npy => "npy",
            OutputFormat::Mat => "mat",
            OutputFormat::Wav => "wav",
            OutputFormat::Csv => "csv",
        };
        write!(f, "{}", name)
    }
}

/// Immutable configuration for one conversion run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output format tag
    pub format: OutputFormat,
    /// One output file per channel
    pub split: bool,
    /// Compressed container variant where the format supports one
    pub compress: bool,
    /// Prepend a synthesized time column
    pub time_track: bool,
    /// Zero-based channel indices; empty selects all channels in file order
    pub channel_selection: Vec<usize>,
    /// Output labels, order-aligned with the selection (time slot first when
    /// `time_track` is set); empty falls back to source metadata names
    pub channel_names: Vec<String>,
    /// Sampling rate in Hz, required for WAV output
    pub sample_rate: Option<u32>,
    /// Destination directory; None writes beside each source file
    pub output_dir: Option<PathBuf>,
    /// Print metadata instead of converting
    pub display_info: bool,
    /// Persist a metadata sidecar next to each source
    pub save_meta: bool,
    /// Convert batch entries on a rayon thread pool
    pub parallel: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(OutputFormat::Npy)
    }
}

impl ExportConfig {
    /// Create a configuration with default settings for the given format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            split: false,
            compress: false,
            time_track: false,
            channel_selection: Vec::new(),
            channel_names: Vec::new(),
            sample_rate: None,
            output_dir: None,
            display_info: false,
            save_meta: false,
            parallel: false,
        }
    }

    /// Builder method: one output file per channel
    pub fn with_split(mut self, enabled: bool) -> Self {
        self.split = enabled;
        self
    }

    /// Builder method: compressed container variant
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Builder method: prepend a synthesized time column
    pub fn with_time_track(mut self, enabled: bool) -> Self {
        self.time_track = enabled;
        self
    }

    /// Builder method: select channels by zero-based index
    pub fn with_selection(mut self, indices: Vec<usize>) -> Self {
        self.channel_selection = indices;
        self
    }

    /// Builder method: output labels aligned with the selection
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.channel_names = names;
        self
    }

    /// Builder method: sampling rate for WAV output
    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    /// Builder method: destination directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// True when output is one file per channel, by flag or by format
    pub fn effective_split(&self) -> bool {
        self.split || self.format.forces_split()
    }

    /// Check flag combinations before any file is processed
    ///
    /// Name counts can only be checked here when the selection is explicit;
    /// with a defaulted "all channels" selection the check happens per file
    /// during assembly instead.
    pub fn validate(&self) -> Result<()> {
        if self.format == OutputFormat::Wav && self.sample_rate.is_none() {
            return Err(ConvertError::MissingParameter(
                "wav output requires a sampling rate (-r/--rate_sampling)".into(),
            ));
        }
        if self.sample_rate == Some(0) {
            return Err(ConvertError::Configuration(
                "sampling rate must be greater than zero".into(),
            ));
        }
        if !self.channel_names.is_empty() && !self.channel_selection.is_empty() {
            let expected = self.channel_selection.len() + usize::from(self.time_track);
            if self.channel_names.len() != expected {
                return Err(ConvertError::Configuration(format!(
                    "{} channel names given but {} are needed ({} selected channels{})",
                    self.channel_names.len(),
                    expected,
                    self.channel_selection.len(),
                    if self.time_track {
                        " plus the time track slot"
                    } else {
                        ""
                    }
                )));
            }
        }
        if self.compress && !self.format.supports_compression() {
            // Documented no-op: the flag is accepted but has no effect here
            log::warn!(
                "{} output has no compressed variant, -z/--zip_compression is ignored",
                self.format
            );
        }
        Ok(())
    }
}

/// Optional defaults loaded from a TOML file (`--config`)
///
/// Command-line flags always win over file values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub output: OutputDefaults,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputDefaults {
    pub format: Option<OutputFormat>,
    pub directory: Option<PathBuf>,
    pub compress: Option<bool>,
}

/// Load configuration defaults from a TOML file
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        ConvertError::Configuration(format!("failed to parse config file {:?}: {}", path, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_requires_sample_rate() {
        let config = ExportConfig::new(OutputFormat::Wav);
        assert!(matches!(
            config.validate(),
            Err(ConvertError::MissingParameter(_))
        ));

        let config = ExportConfig::new(OutputFormat::Wav).with_sample_rate(48_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wav_forces_split() {
        let config = ExportConfig::new(OutputFormat::Wav).with_sample_rate(48_000);
        assert!(!config.split);
        assert!(config.effective_split());
    }

    #[test]
    fn test_name_count_must_match_selection() {
        let config = ExportConfig::new(OutputFormat::Mat)
            .with_selection(vec![0, 2, 3])
            .with_names(vec!["x".into(), "y".into()]);
        assert!(matches!(
            config.validate(),
            Err(ConvertError::Configuration(_))
        ));

        // With a time track the plan reserves one extra slot
        let config = ExportConfig::new(OutputFormat::Csv)
            .with_selection(vec![0, 1])
            .with_names(vec!["t".into(), "x".into(), "y".into()])
            .with_time_track(true);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Npy.extension(false), "npy");
        assert_eq!(OutputFormat::Npy.extension(true), "npz");
        assert_eq!(OutputFormat::Mat.extension(true), "mat");
        assert_eq!(OutputFormat::Csv.extension(true), "csv");
    }

    #[test]
    fn test_file_config_deserialization() {
        let toml_content = r#"
            [output]
            format = "mat"
            directory = "exports"
        "#;

        let config: FileConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.output.format, Some(OutputFormat::Mat));
        assert_eq!(config.output.directory, Some(PathBuf::from("exports")));
        assert_eq!(config.output.compress, None);
    }
}
