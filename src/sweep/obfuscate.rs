//! Rename-before-delete so the original name does not linger in directory
//! metadata.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use rand::RngCore;

use crate::core::errors::{FkError, Result};

const NAME_BYTES: usize = 16;
const MAX_ATTEMPTS: usize = 8;

/// Rename a file to a random name in the same directory, keeping its extension.
pub fn obfuscate_file(path: &Path) -> Result<PathBuf> {
    let extension = path.extension().map(OsString::from);
    rename_randomly(path, extension.as_deref())
}

/// Rename a directory to a random name in the same parent.
pub fn obfuscate_directory(path: &Path) -> Result<PathBuf> {
    rename_randomly(path, None)
}

fn rename_randomly(path: &Path, extension: Option<&std::ffi::OsStr>) -> Result<PathBuf> {
    fs::symlink_metadata(path).map_err(|e| FkError::io(path, e))?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    for _ in 0..MAX_ATTEMPTS {
        let mut name = OsString::from(random_hex_name());
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let target = parent.join(&name);
        if fs::symlink_metadata(&target).is_ok() {
            continue;
        }
        fs::rename(path, &target).map_err(|e| FkError::io(path, e))?;
        return Ok(target);
    }

    Err(FkError::Runtime {
        details: format!(
            "no free random name for {} after {MAX_ATTEMPTS} attempts",
            path.display()
        ),
    })
}

fn random_hex_name() -> String {
    let mut bytes = [0u8; NAME_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes
        .iter()
        .fold(String::with_capacity(NAME_BYTES * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
