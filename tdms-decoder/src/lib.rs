//! TDMS Decoder Library
//!
//! A stateless, reusable library for reading National Instruments TDMS
//! recordings (the streaming binary format written by LabVIEW and
//! NI-DAQmx-based tools).
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Parses the segmented container (lead-in, metadata, raw data)
//! - Exposes file-, group-, and channel-level properties in file order
//! - Widens numeric channel samples to `f64`
//!
//! The library does NOT:
//! - Select or relabel channels
//! - Synthesize time tracks
//! - Write any output format
//!
//! All higher-level functionality is in the application layer (tdms-convert).
//!
//! # Example Usage
//!
//! ```no_run
//! use tdms_decoder::TdmsFile;
//! use std::path::Path;
//!
//! let file = TdmsFile::open(Path::new("recording.tdms")).unwrap();
//! for group in &file.groups {
//!     for channel in &group.channels {
//!         println!(
//!             "{}/{}: {} samples of {}",
//!             group.name,
//!             channel.name,
//!             channel.len(),
//!             channel.data_type
//!         );
//!     }
//! }
//! ```

// Public modules
pub mod reader;
pub mod types;

// Re-export main types for convenience
pub use reader::{Channel, Group, TdmsFile};
pub use types::{DataType, PropertyValue, Result, TdmsError, Timestamp};

// Internal modules (not exposed in public API)
mod segment;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
