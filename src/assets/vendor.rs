// src/assets/vendor.rs

//! Import third-party stylesheets from the bower directory into the sass
//! tree so `main.scss` can `@import` them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::report::{write_output, TransformReport};
use crate::assets::AssetTransform;
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;

/// Stylesheets copied from `<bower>` into `<sass.vendor>`.
pub const VENDOR_STYLESHEETS: &[&str] = &["normalize-scss/_normalize.scss"];

#[derive(Debug)]
pub struct VendorCssImport {
    fs: Arc<dyn FileSystem>,
    bower: PathBuf,
    dest: PathBuf,
}

impl VendorCssImport {
    pub fn new(fs: Arc<dyn FileSystem>, bower: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            bower: bower.into(),
            dest: dest.into(),
        }
    }

    /// `None` when `paths.bower` is not configured.
    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Option<Self>> {
        let Some(bower) = cfg.paths.resolve_optional("bower") else {
            return Ok(None);
        };
        Ok(Some(Self::new(fs, bower, cfg.paths.resolve("sass.vendor")?)))
    }
}

impl AssetTransform for VendorCssImport {
    fn name(&self) -> &str {
        "vendor-css"
    }

    fn run(&self) -> Result<TransformReport> {
        let mut outputs = Vec::new();
        for sheet in VENDOR_STYLESHEETS {
            let src = self.bower.join(sheet);
            let bytes = self.fs.read(&src)?;
            let file_name = Path::new(sheet)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(sheet));
            outputs.push(write_output(self.fs.as_ref(), &self.dest, &file_name, &bytes)?);
        }
        Ok(TransformReport::from_outputs(self.name(), outputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn copies_normalize_into_sass_vendor() {
        let fs = MockFileSystem::new();
        fs.add_file("bower/normalize-scss/_normalize.scss", b"html{}".to_vec());

        let t = VendorCssImport::new(Arc::new(fs.clone()), "bower", "sass/vendor");
        t.run().unwrap();

        assert_eq!(fs.contents("sass/vendor/_normalize.scss"), Some(b"html{}".to_vec()));
    }

    #[test]
    fn missing_vendor_source_is_an_error() {
        let fs = MockFileSystem::new();
        let t = VendorCssImport::new(Arc::new(fs), "bower", "sass/vendor");
        assert!(t.run().is_err());
    }
}
