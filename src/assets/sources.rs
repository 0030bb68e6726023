// src/assets/sources.rs

//! Source file discovery through the [`FileSystem`] abstraction.
//!
//! Results are sorted so that concatenation order (and therefore output
//! bytes) is stable from run to run.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;

/// Files directly inside `dir` whose extension is `ext` (no recursion).
///
/// A missing directory yields an empty list.
pub fn files_with_extension(fs: &dyn FileSystem, dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !fs.is_dir(dir) {
        debug!(dir = ?dir, "source directory missing; no files");
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs
        .read_dir(dir)?
        .into_iter()
        .filter(|p| fs.is_file(p))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Every file below `root`, recursively.
pub fn walk_files(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !fs.is_dir(root) {
        debug!(dir = ?root, "source directory missing; no files");
        return Ok(files);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
