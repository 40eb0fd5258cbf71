//! TDMS conversion library
//!
//! Converts National Instruments TDMS recordings into common scientific
//! data container formats: NumPy array archives (npy/npz), MATLAB MAT
//! files, WAV audio, and CSV text tables.
//!
//! The pipeline stages are exposed directly so they can be composed from
//! other analysis code: every function returns data and only the explicit
//! write/save operations touch the filesystem.
//!
//! # Example Usage
//!
//! ```no_run
//! use tdms_convert::{assemble, select, ExportConfig, OutputFormat};
//! use tdms_decoder::TdmsFile;
//! use std::path::Path;
//!
//! let file = TdmsFile::open(Path::new("recording.tdms")).unwrap();
//! let channels = &file.first_group().unwrap().channels;
//!
//! // Pick two channels and read them into labeled columns
//! let selection = select(channels.len(), &[0, 2]).unwrap();
//! let table = assemble(&file, &selection, &[], true).unwrap();
//! for column in &table.columns {
//!     println!("{}: {} samples", column.label, column.samples.len());
//! }
//!
//! // Or run the whole pipeline over a file or folder
//! let config = ExportConfig::new(OutputFormat::Mat).with_split(true);
//! let summary = tdms_convert::run(Path::new("recording.tdms"), &config).unwrap();
//! assert!(summary.all_succeeded());
//! ```

// Public modules
pub mod assemble;
pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod meta;
pub mod select;

// Re-export the pipeline surface for convenience
pub use assemble::{assemble, AssembledTable, Column, TIME_LABEL};
pub use batch::{run, BatchSummary, SourceOutcome, SOURCE_EXTENSION};
pub use config::{ExportConfig, FileConfig, OutputFormat};
pub use error::{ConvertError, Result};
pub use export::{write, SourceContext};
pub use select::select;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
