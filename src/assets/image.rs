// src/assets/image.rs

//! Image optimization, mirroring `img.src` into `img.dest`.
//!
//! PNGs are recompressed losslessly with `oxipng` and stripped of
//! metadata chunks that do not affect rendering; other formats are copied
//! as they are. A configured shell command replaces the built-in step for
//! every file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use oxipng::{Options, StripChunks};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::assets::report::{write_output, OutputFile, TransformReport};
use crate::assets::sources::walk_files;
use crate::assets::AssetTransform;
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;

/// `oxipng` preset; 2 is its default balance of speed and size.
const PNG_PRESET: u8 = 2;

/// How each image is optimized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOptimizer {
    /// Lossless PNG recompression, other formats copied.
    Builtin,
    /// Run a shell command template; `{input}` and `{output}` are replaced
    /// with quoted paths of scratch files outside the destination.
    Command(String),
}

#[derive(Debug)]
pub struct ImageTransform {
    fs: Arc<dyn FileSystem>,
    src: PathBuf,
    dest: PathBuf,
    optimizer: ImageOptimizer,
}

impl ImageTransform {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        src: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        optimizer: ImageOptimizer,
    ) -> Self {
        Self {
            fs,
            src: src.into(),
            dest: dest.into(),
            optimizer,
        }
    }

    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let optimizer = match &cfg.images.optimizer {
            Some(cmd) if !cmd.trim().is_empty() => ImageOptimizer::Command(cmd.clone()),
            _ => ImageOptimizer::Builtin,
        };
        Ok(Self::new(
            fs,
            cfg.paths.resolve("img.src")?,
            cfg.paths.resolve("img.dest")?,
            optimizer,
        ))
    }

    fn optimize(&self, file: &Path, rel: &Path) -> Result<OutputFile> {
        let bytes = self.fs.read(file)?;
        let optimized = match &self.optimizer {
            ImageOptimizer::Builtin if is_png(rel) => optimize_png(rel, bytes),
            ImageOptimizer::Builtin => bytes,
            ImageOptimizer::Command(template) => run_optimizer(template, rel, &bytes)?,
        };
        write_output(self.fs.as_ref(), &self.dest, rel, &optimized)
    }
}

impl AssetTransform for ImageTransform {
    fn name(&self) -> &str {
        "img"
    }

    fn run(&self) -> Result<TransformReport> {
        let files = walk_files(self.fs.as_ref(), &self.src)?;
        let mut outputs = Vec::with_capacity(files.len());

        for file in files {
            let rel = file
                .strip_prefix(&self.src)
                .map_err(|_| anyhow!("image {:?} is not under {:?}", file, self.src))?
                .to_path_buf();
            debug!(image = %rel.display(), "optimizing");
            outputs.push(self.optimize(&file, &rel)?);
        }

        Ok(TransformReport::from_outputs(self.name(), outputs))
    }
}

fn is_png(rel: &Path) -> bool {
    rel.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Recompress a PNG. An image oxipng cannot read is kept as it is.
fn optimize_png(rel: &Path, bytes: Vec<u8>) -> Vec<u8> {
    let mut opts = Options::from_preset(PNG_PRESET);
    opts.strip = StripChunks::Safe;
    match oxipng::optimize_from_memory(&bytes, &opts) {
        Ok(optimized) => {
            debug!(image = %rel.display(), before = bytes.len(), after = optimized.len(), "png recompressed");
            optimized
        }
        Err(e) => {
            warn!(image = %rel.display(), error = %e, "png not optimized; copying as is");
            bytes
        }
    }
}

/// Run the user's command over scratch copies of the image. Both scratch
/// files are removed when this returns, whether or not the command worked.
fn run_optimizer(template: &str, rel: &Path, bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    let suffix = rel
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut input = tempfile::Builder::new()
        .prefix("assetflow-in-")
        .suffix(&suffix)
        .tempfile()
        .context("creating optimizer input file")?;
    input.write_all(bytes).context("staging optimizer input")?;
    input.flush().context("staging optimizer input")?;
    let output: NamedTempFile = tempfile::Builder::new()
        .prefix("assetflow-out-")
        .suffix(&suffix)
        .tempfile()
        .context("creating optimizer output file")?;

    let cmd = template
        .replace("{input}", &shell_quote(&input.path().to_string_lossy()))
        .replace("{output}", &shell_quote(&output.path().to_string_lossy()));

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&cmd);
        c
    };

    let status = command
        .status()
        .with_context(|| format!("spawning image optimizer `{cmd}`"))?;
    if !status.success() {
        return Err(anyhow!(
            "image optimizer exited with code {} for {:?}",
            status.code().unwrap_or(-1),
            rel
        ));
    }

    std::fs::read(output.path()).with_context(|| format!("reading optimizer output for {:?}", rel))
}

fn shell_quote(s: &str) -> String {
    if cfg!(windows) {
        format!("\"{s}\"")
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
