// src/assets/css.rs

//! SCSS → prefixed, minified CSS.
//!
//! Compiles `<css.src>/main.scss` with `grass` (`sass.src` on the load
//! path), adds vendor prefixes for [`BROWSER_TARGETS`] and minifies with
//! `lightningcss`, then writes `<css.dest>/main.min.css`. A stylesheet that
//! fails to compile is reported, never written.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::assets::rename::min_file_name;
use crate::assets::report::{write_output, TransformReport};
use crate::assets::AssetTransform;
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;

/// Entry stylesheet inside `css.src`.
pub const CSS_ENTRY: &str = "main.scss";

/// browserslist query the prefixer targets.
pub const BROWSER_TARGETS: &str = "last 2 versions";

#[derive(Debug)]
pub struct CssTransform {
    fs: Arc<dyn FileSystem>,
    entry: PathBuf,
    include_dir: PathBuf,
    dest: PathBuf,
}

impl CssTransform {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        entry: impl Into<PathBuf>,
        include_dir: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            entry: entry.into(),
            include_dir: include_dir.into(),
            dest: dest.into(),
        }
    }

    /// Build from config; fails if `css.src`, `css.dest` or `sass.src` is
    /// missing.
    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let entry = cfg.paths.resolve("css.src")?.join(CSS_ENTRY);
        let include_dir = cfg.paths.resolve("sass.src")?;
        let dest = cfg.paths.resolve("css.dest")?;
        Ok(Self::new(fs, entry, include_dir, dest))
    }

    /// Where the compiled stylesheet lands.
    pub fn output_path(&self) -> PathBuf {
        self.dest.join(self.output_name())
    }

    fn output_name(&self) -> String {
        let css_name = Path::new(CSS_ENTRY).with_extension("css");
        min_file_name(&css_name.to_string_lossy())
    }

    fn compile(&self) -> std::result::Result<String, String> {
        let source = self
            .fs
            .read_to_string(&self.entry)
            .map_err(|e| format!("{e:#}"))?;

        let sass_fs = SassFs(self.fs.as_ref());
        let mut options = grass::Options::default()
            .fs(&sass_fs)
            .style(grass::OutputStyle::Expanded)
            .load_path(&self.include_dir);
        if let Some(entry_dir) = self.entry.parent() {
            options = options.load_path(entry_dir);
        }

        let css = grass::from_string(source, &options).map_err(|e| e.to_string())?;
        prefix_and_minify(&css)
    }
}

/// Autoprefix for [`BROWSER_TARGETS`] and minify.
pub fn prefix_and_minify(css: &str) -> std::result::Result<String, String> {
    let browsers = Browsers::from_browserslist([BROWSER_TARGETS]).map_err(|e| e.to_string())?;
    let targets = || Targets {
        browsers: browsers.clone(),
        ..Targets::default()
    };

    let mut sheet = StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;
    sheet
        .minify(MinifyOptions {
            targets: targets(),
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets: targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(printed.code)
}

impl AssetTransform for CssTransform {
    fn name(&self) -> &str {
        "css"
    }

    fn run(&self) -> Result<TransformReport> {
        let css = match self.compile() {
            Ok(css) => css,
            Err(message) => return Ok(TransformReport::compile_failed(self.name(), message)),
        };

        let output = write_output(
            self.fs.as_ref(),
            &self.dest,
            Path::new(&self.output_name()),
            css.as_bytes(),
        )?;
        Ok(TransformReport::from_outputs(self.name(), vec![output]))
    }
}

/// Lets `grass` resolve `@import`/`@use` through our filesystem.
#[derive(Debug)]
struct SassFs<'a>(&'a dyn FileSystem);

impl grass::Fs for SassFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.0.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.0.is_file(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.0
            .read(path)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("{e:#}")))
    }
}
