// src/assets/js.rs

//! JavaScript bundles: concatenate → (lint) → minify → rename.
//!
//! Two bundles are produced, vendor first:
//! - `<vendor.src>/*.js` → `<vendor.dest>/vendor.min.js`
//! - `<js.src>/*.js` → `<js.dest>/main.min.js` (linted)
//!
//! Files are joined with an explicit `;` so sources that rely on automatic
//! semicolon insertion stay separate statements. The bundle is parsed
//! before minifying; a bundle that does not parse is reported as a compile
//! failure and the previous output is kept.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use minify_js::{minify, Session, TopLevelMode};
use tracing::{debug, warn};

use crate::assets::lint::lint_source;
use crate::assets::rename::min_file_name;
use crate::assets::report::{write_output, OutputFile, TransformReport};
use crate::assets::sources::files_with_extension;
use crate::assets::AssetTransform;
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;

/// One concatenated bundle.
#[derive(Debug, Clone)]
pub struct JsBundle {
    /// Concatenated file name before renaming, e.g. `main.js`.
    pub file_name: String,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub lint: bool,
}

impl JsBundle {
    pub fn output_name(&self) -> String {
        min_file_name(&self.file_name)
    }
}

#[derive(Debug)]
pub struct JsTransform {
    fs: Arc<dyn FileSystem>,
    bundles: Vec<JsBundle>,
}

impl JsTransform {
    pub fn new(fs: Arc<dyn FileSystem>, bundles: Vec<JsBundle>) -> Self {
        Self { fs, bundles }
    }

    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let vendor = JsBundle {
            file_name: "vendor.js".to_string(),
            src: cfg.paths.resolve("vendor.src")?,
            dest: cfg.paths.resolve("vendor.dest")?,
            lint: false,
        };
        let main = JsBundle {
            file_name: "main.js".to_string(),
            src: cfg.paths.resolve("js.src")?,
            dest: cfg.paths.resolve("js.dest")?,
            lint: cfg.js.lint,
        };
        Ok(Self::new(fs, vec![vendor, main]))
    }

    fn build_bundle(&self, bundle: &JsBundle) -> Result<BundleResult> {
        let files = files_with_extension(self.fs.as_ref(), &bundle.src, "js")?;
        if files.is_empty() {
            debug!(bundle = %bundle.file_name, src = ?bundle.src, "no sources for bundle");
            return Ok(BundleResult::Empty);
        }

        let mut sources = Vec::with_capacity(files.len());
        for file in &files {
            let source = self.fs.read_to_string(file)?;
            if bundle.lint {
                report_lint(file, &source);
            }
            sources.push(source);
        }

        let minified = match minify_bundle(&concatenate(&sources)) {
            Ok(code) => code,
            Err(message) => {
                return Ok(BundleResult::Failed(format!("{}: {message}", bundle.file_name)));
            }
        };

        let output = write_output(
            self.fs.as_ref(),
            &bundle.dest,
            Path::new(&bundle.output_name()),
            &minified,
        )?;
        Ok(BundleResult::Written(output))
    }
}

enum BundleResult {
    Empty,
    Written(OutputFile),
    Failed(String),
}

/// Join sources the way `concat` followed by a parsing minifier sees them:
/// each file ends its last statement before the next one starts.
fn concatenate(sources: &[String]) -> String {
    let mut out = String::new();
    for source in sources {
        if !out.is_empty() {
            out.push_str("\n;\n");
        }
        out.push_str(source);
    }
    out
}

/// Parse and minify one bundle. Top-level names are kept so bundles can
/// still talk to each other through globals.
fn minify_bundle(code: &str) -> std::result::Result<Vec<u8>, String> {
    let session = Session::new();
    let mut out = Vec::new();
    minify(&session, TopLevelMode::Global, code.as_bytes(), &mut out)
        .map_err(|e| format!("{e:?}"))?;
    Ok(out)
}

fn report_lint(file: &Path, source: &str) {
    for w in lint_source(source) {
        warn!(
            file = %file.display(),
            line = w.line,
            rule = %w.rule,
            "lint: {}",
            w.message
        );
    }
}

impl AssetTransform for JsTransform {
    fn name(&self) -> &str {
        "js"
    }

    fn run(&self) -> Result<TransformReport> {
        let mut outputs = Vec::new();
        for bundle in &self.bundles {
            match self.build_bundle(bundle)? {
                BundleResult::Empty => {}
                BundleResult::Written(out) => outputs.push(out),
                BundleResult::Failed(message) => {
                    return Ok(TransformReport::compile_failed(self.name(), message));
                }
            }
        }
        Ok(TransformReport::from_outputs(self.name(), outputs))
    }
}
