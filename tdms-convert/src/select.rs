//! Channel selection
//!
//! Narrows the working set of channels to the user's requested indices and
//! validates bounds. Duplicates are preserved as given: selecting the same
//! channel twice (e.g. to relabel it for two outputs) is a valid use case.

use crate::error::{ConvertError, Result};

/// Resolve the requested channel indices against a file's channel count
///
/// An empty request selects all channels in file order. Any index outside
/// `0..channel_count` fails, naming the offending index and the valid bound.
pub fn select(channel_count: usize, requested: &[usize]) -> Result<Vec<usize>> {
    if requested.is_empty() {
        return Ok((0..channel_count).collect());
    }
    for &index in requested {
        if index >= channel_count {
            return Err(ConvertError::OutOfRange {
                index,
                count: channel_count,
            });
        }
    }
    Ok(requested.to_vec())
}
