//! Directory emptiness probe.

use std::fs;
use std::path::Path;

use crate::core::errors::{FkError, Result};

/// Whether `dir` has no entries at all, hidden ones included.
///
/// Reads at most one entry. Errors opening or reading the directory are
/// propagated so the caller can skip the candidate.
pub fn is_dir_empty(dir: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(dir).map_err(|e| FkError::io(dir, e))?;
    match entries.next() {
        None => Ok(true),
        Some(Ok(_)) => Ok(false),
        Some(Err(e)) => Err(FkError::io(dir, e)),
    }
}
