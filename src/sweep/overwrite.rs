//! Multi-pass in-place overwrite followed by unlink.
//!
//! Each pass writes a deterministic pattern derived from the pass index and
//! buffer offset over the file's original byte range, then syncs before the
//! next pass starts. The pattern is not random: consecutive passes are only
//! guaranteed to differ from one another.
//!
//! This offers nothing on storage that remaps writes (SSD wear leveling,
//! copy-on-write filesystems, snapshots).

#![allow(clippy::cast_possible_truncation)]

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::core::errors::{FkError, Result};
use crate::logger::activity::{ActivityEvent, ActivityLogger};

/// Scratch buffer size for one pattern chunk.
pub const CHUNK_SIZE: usize = 8192;

/// Fill `buf` with the pattern for pass `pass`: byte `i` is `pass ^ i`
/// truncated to eight bits.
pub fn fill_pass_pattern(buf: &mut [u8], pass: u32) {
    let seed = pass as u8;
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = seed ^ (i as u8);
    }
}

/// Write one full pass of `buf` over the first `size` bytes of `file` and
/// force it to durable storage.
pub fn overwrite_pass(file: &mut File, path: &Path, size: u64, buf: &[u8]) -> Result<()> {
    file.seek(SeekFrom::Start(0))
        .map_err(|e| FkError::io(path, e))?;

    let mut written: u64 = 0;
    while written < size {
        let remaining = size - written;
        let to_write = if remaining > buf.len() as u64 {
            buf.len()
        } else {
            remaining as usize
        };
        file.write_all(&buf[..to_write])
            .map_err(|e| FkError::io(path, e))?;
        written += to_write as u64;
    }

    file.sync_all().map_err(|e| FkError::io(path, e))
}

/// Overwrite `path` `passes` times, then remove it.
///
/// `passes == 0` skips the overwrite loop and only unlinks. Any failure
/// returns immediately and leaves the file in place.
pub fn secure_delete(path: &Path, passes: u32, logger: &mut ActivityLogger) -> Result<()> {
    if passes > 0 {
        let mut file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| FkError::io(path, e))?;
        let size = file.metadata().map_err(|e| FkError::io(path, e))?.len();

        let mut buf = vec![0u8; CHUNK_SIZE];
        for pass in 0..passes {
            fill_pass_pattern(&mut buf, pass);
            overwrite_pass(&mut file, path, size, &buf)?;
            logger.log(ActivityEvent::OverwritePass {
                path: PathBuf::from(path),
                pass: pass + 1,
                passes,
            });
        }
    }

    fs::remove_file(path).map_err(|e| FkError::io(path, e))
}
