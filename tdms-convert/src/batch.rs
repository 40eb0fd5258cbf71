//! Batch driver
//!
//! Runs the conversion pipeline over a single file or every `.tdms` file in
//! a directory (immediate entries only, name-sorted for deterministic
//! output). A failure in one source is recorded with its identity and does
//! not abort the batch; filesystem errors during enumeration are fatal
//! because there is nothing to iterate.

use crate::assemble::assemble;
use crate::config::ExportConfig;
use crate::error::{ConvertError, Result};
use crate::export::{self, SourceContext};
use crate::meta;
use crate::select::select;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tdms_decoder::TdmsFile;

/// Extension of the source files this tool converts
pub const SOURCE_EXTENSION: &str = "tdms";

/// Outcome of one source file
#[derive(Debug, Serialize)]
pub struct SourceOutcome {
    pub source: PathBuf,
    /// Paths written for this source (empty on failure or display-only runs)
    pub outputs: Vec<PathBuf>,
    /// Error detail when this source failed
    pub error: Option<String>,
}

impl SourceOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one batch run, in input order
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub results: Vec<SourceOutcome>,
}

impl BatchSummary {
    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.succeeded_count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            match &result.error {
                None => writeln!(
                    f,
                    "  ✓ {:?} -> {} file(s)",
                    result.source,
                    result.outputs.len()
                )?,
                Some(error) => writeln!(f, "  ✗ {:?}: {}", result.source, error)?,
            }
        }
        writeln!(
            f,
            "{} converted, {} failed",
            self.succeeded_count(),
            self.failed_count()
        )
    }
}

/// Run the conversion pipeline over `path` with the given configuration
///
/// Validates the configuration before touching any file, so flag-level
/// mistakes (wav without a rate, short name lists) never produce partial
/// output.
pub fn run(path: &Path, config: &ExportConfig) -> Result<BatchSummary> {
    config.validate()?;
    let sources = collect_sources(path)?;
    log::info!("processing {} source file(s)", sources.len());

    let results: Vec<SourceOutcome> = if config.parallel {
        // Sources share no state; par_iter keeps input order in the summary
        sources
            .par_iter()
            .map(|source| outcome(source, process_source(source, config)))
            .collect()
    } else {
        sources
            .iter()
            .map(|source| outcome(source, process_source(source, config)))
            .collect()
    };

    Ok(BatchSummary { results })
}

/// Record one source's result, folding its error into the summary
fn outcome(source: &Path, result: Result<Vec<PathBuf>>) -> SourceOutcome {
    match result {
        Ok(outputs) => SourceOutcome {
            source: source.to_path_buf(),
            outputs,
            error: None,
        },
        Err(error) => {
            log::error!("{:?}: {}", source, error);
            SourceOutcome {
                source: source.to_path_buf(),
                outputs: Vec::new(),
                error: Some(error.to_string()),
            }
        }
    }
}

/// Enumerate the source files named by `path`
fn collect_sources(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(ConvertError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("path {:?} does not exist", path),
        )));
    }

    if path.is_file() {
        if !has_source_extension(path) {
            return Err(ConvertError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{:?} is not a .{} file", path, SOURCE_EXTENSION),
            )));
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_file() && has_source_extension(&entry_path) {
            sources.push(entry_path);
        }
    }
    // Directory-listing order is filesystem-dependent; sort for stable runs
    sources.sort();

    if sources.is_empty() {
        return Err(ConvertError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no .{} files found in {:?}", SOURCE_EXTENSION, path),
        )));
    }
    Ok(sources)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Convert one source file, returning the written paths
fn process_source(source: &Path, config: &ExportConfig) -> Result<Vec<PathBuf>> {
    log::info!("processing {:?}", source);
    let file = TdmsFile::open(source)?;

    let mut outputs = Vec::new();
    if config.display_info {
        meta::print(&file, source);
    }
    if config.save_meta {
        outputs.push(meta::save_sidecar(
            &file,
            source,
            config.output_dir.as_deref(),
        )?);
    }
    if config.display_info {
        // Display mode converts nothing
        return Ok(outputs);
    }

    let channels = file
        .first_group()
        .map(|g| g.channels.as_slice())
        .unwrap_or(&[]);
    if channels.is_empty() {
        return Err(ConvertError::EmptySource(source.to_path_buf()));
    }

    let selection = select(channels.len(), &config.channel_selection)?;
    let table = assemble(&file, &selection, &config.channel_names, config.time_track)?;

    let context = SourceContext::new(source, config.output_dir.as_deref(), table.start_time());
    outputs.extend(export::write(&table, config, &context)?);
    Ok(outputs)
}
