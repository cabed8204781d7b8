//! Sequential pre-order tree walk with skip-subtree control.
//!
//! Children are visited in lexical order by file name, a directory before
//! anything beneath it. Entries below the root are stat'ed with
//! `symlink_metadata`, so symbolic links are reported as themselves and never
//! followed. The root itself is resolved through links.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{FkError, Result};

/// A single entry discovered during a walk.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub metadata: fs::Metadata,
    /// Zero for the root.
    pub depth: usize,
}

impl WalkEntry {
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub const fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// What the visitor sees for each position in the tree.
#[derive(Debug)]
pub enum Visit<'a> {
    Entry(&'a WalkEntry),
    /// A child could not be stat'ed or a directory below the root could not be listed.
    Error { path: &'a Path, error: &'a FkError },
}

/// Visitor verdict. `SkipDir` on a directory entry prunes its subtree; it is
/// ignored for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    SkipDir,
}

/// Walk `root`, calling `visit` for the root itself and then every entry below.
///
/// Fails only when the root cannot be stat'ed or listed, or is not a
/// directory. Everything below the root is reported to the visitor and the
/// walk carries on.
pub fn walk<F>(root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(Visit<'_>) -> WalkControl,
{
    let metadata = fs::metadata(root).map_err(|source| FkError::RootUnavailable {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(FkError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let root_entry = WalkEntry {
        path: root.to_path_buf(),
        metadata,
        depth: 0,
    };
    if visit(Visit::Entry(&root_entry)) == WalkControl::SkipDir {
        return Ok(());
    }

    let mut stack: Vec<(PathBuf, usize)> = Vec::new();
    let children = sorted_children(root).map_err(|source| FkError::RootUnavailable {
        path: root.to_path_buf(),
        source,
    })?;
    push_reversed(&mut stack, children, 1);

    while let Some((path, depth)) = stack.pop() {
        let metadata = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                let error = FkError::io(&path, e);
                visit(Visit::Error {
                    path: &path,
                    error: &error,
                });
                continue;
            }
        };

        let entry = WalkEntry {
            path,
            metadata,
            depth,
        };
        let control = visit(Visit::Entry(&entry));
        if !entry.is_dir() || control == WalkControl::SkipDir {
            continue;
        }

        match sorted_children(&entry.path) {
            Ok(children) => push_reversed(&mut stack, children, depth + 1),
            Err(e) => {
                let error = FkError::io(&entry.path, e);
                visit(Visit::Error {
                    path: &entry.path,
                    error: &error,
                });
            }
        }
    }

    Ok(())
}

fn sorted_children(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name());
    }
    names.sort();
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

fn push_reversed(stack: &mut Vec<(PathBuf, usize)>, children: Vec<PathBuf>, depth: usize) {
    stack.extend(children.into_iter().rev().map(|p| (p, depth)));
}
