// src/assets/report.rs

//! Transform results and the single write path every transform uses.

use std::path::{Component, Path, PathBuf};

use anyhow::anyhow;
use tracing::{error, info};

use crate::errors::Result;
use crate::fs::FileSystem;

/// One file produced (or confirmed up to date) by a transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub bytes: usize,
    /// blake3 digest of the content, hex encoded.
    pub digest: String,
    /// False when the destination already held identical bytes.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// At least one output was (re)written.
    Written,
    /// Every output already matched; nothing was touched.
    Unchanged,
    /// No source files matched.
    NoSources,
    /// The compile step failed; previous output is left as it was.
    CompileFailed(String),
}

#[derive(Debug, Clone)]
pub struct TransformReport {
    pub transform: String,
    pub outcome: TransformOutcome,
    pub outputs: Vec<OutputFile>,
}

impl TransformReport {
    /// Derive the outcome from what was written.
    pub fn from_outputs(transform: impl Into<String>, outputs: Vec<OutputFile>) -> Self {
        let outcome = if outputs.is_empty() {
            TransformOutcome::NoSources
        } else if outputs.iter().any(|o| o.changed) {
            TransformOutcome::Written
        } else {
            TransformOutcome::Unchanged
        };
        Self {
            transform: transform.into(),
            outcome,
            outputs,
        }
    }

    pub fn compile_failed(transform: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            outcome: TransformOutcome::CompileFailed(message.into()),
            outputs: Vec::new(),
        }
    }

    /// Advisory console output; never affects control flow.
    pub fn log(&self) {
        match &self.outcome {
            TransformOutcome::CompileFailed(message) => {
                error!(transform = %self.transform, "compile failed; keeping previous output:\n{message}");
            }
            TransformOutcome::NoSources => {
                info!(transform = %self.transform, "no source files matched");
            }
            outcome => {
                for out in &self.outputs {
                    info!(
                        transform = %self.transform,
                        file = %out.path.display(),
                        bytes = out.bytes,
                        changed = out.changed,
                        "output"
                    );
                }
                info!(transform = %self.transform, ?outcome, files = self.outputs.len(), "transform finished");
            }
        }
    }
}

/// Write `contents` to `dest_dir/rel`, skipping the write when the file
/// already holds exactly these bytes.
///
/// `rel` must stay inside `dest_dir`: absolute paths and `..` are rejected.
pub fn write_output(
    fs: &dyn FileSystem,
    dest_dir: &Path,
    rel: &Path,
    contents: &[u8],
) -> Result<OutputFile> {
    if rel.as_os_str().is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(anyhow!("refusing to write {:?} outside of {:?}", rel, dest_dir).into());
    }

    let path = dest_dir.join(rel);
    let digest = blake3::hash(contents).to_hex().to_string();

    let changed = match fs.read(&path) {
        Ok(existing) => existing != contents,
        Err(_) => true,
    };

    if changed {
        fs.write(&path, contents)?;
    }

    Ok(OutputFile {
        path,
        bytes: contents.len(),
        digest,
        changed,
    })
}
