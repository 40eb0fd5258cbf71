//! Metadata rendering
//!
//! Renders the file-, group-, and channel-level property mappings of a
//! source file in a stable, human-readable form. The same rendering backs
//! both the console display (`-d`) and the persisted sidecar file (`-m`).

use crate::error::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tdms_decoder::TdmsFile;

/// Extension of the metadata sidecar written beside the source file
pub const SIDECAR_EXTENSION: &str = "info";

/// Render all properties of a source file
///
/// Property order follows the file; repeated runs over an unmodified source
/// produce identical text.
pub fn render(file: &TdmsFile, source: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "TDMS file {:?}", source);
    for (name, value) in &file.properties {
        let _ = writeln!(out, "  {}: {}", name, value);
    }
    for group in &file.groups {
        let _ = writeln!(out, "  Group {:?}", group.name);
        for (name, value) in &group.properties {
            let _ = writeln!(out, "    {}: {}", name, value);
        }
        for channel in &group.channels {
            let _ = writeln!(
                out,
                "    Channel {:?} [{}, {} samples]",
                channel.name,
                channel.data_type,
                channel.len()
            );
            for (name, value) in &channel.properties {
                let _ = writeln!(out, "      {}: {}", name, value);
            }
        }
    }
    out
}

/// Print the metadata rendering to the console
pub fn print(file: &TdmsFile, source: &Path) {
    print!("{}", render(file, source));
}

/// Persist the metadata rendering to a `.info` sidecar
///
/// The sidecar uses the source's base name and is written beside the source,
/// or into `output_dir` when one is configured. An existing sidecar is
/// overwritten: last write wins.
pub fn save_sidecar(file: &TdmsFile, source: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let file_name = source
        .file_stem()
        .map(|stem| {
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(SIDECAR_EXTENSION);
            name
        })
        .unwrap_or_else(|| format!("metadata.{}", SIDECAR_EXTENSION).into());

    let directory = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => source.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    let path = directory.join(file_name);

    std::fs::write(&path, render(file, source))?;
    log::info!("metadata sidecar written to {:?}", path);
    Ok(path)
}
