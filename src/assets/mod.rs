// src/assets/mod.rs

//! Asset transforms: read sources, run them through a fixed chain of steps
//! and write the result under a destination directory.
//!
//! - [`css`] compiles the SCSS entry point into `main.min.css`.
//! - [`js`] concatenates, lints and minifies the main and vendor bundles.
//! - [`image`] optimizes (or copies) images, mirroring the source tree.
//! - [`vendor`] imports third-party stylesheets into the sass tree.
//!
//! Transforms are synchronous; the task layer runs them on the blocking
//! pool. Every write goes through [`crate::fs::FileSystem`].

use std::fmt;

use crate::errors::Result;

pub mod css;
pub mod image;
pub mod js;
pub mod lint;
pub mod rename;
pub mod report;
pub mod sources;
pub mod vendor;

pub use css::CssTransform;
pub use image::{ImageOptimizer, ImageTransform};
pub use js::{JsBundle, JsTransform};
pub use report::{OutputFile, TransformOutcome, TransformReport};
pub use vendor::VendorCssImport;

/// A read → process → write unit producing optimized output files.
///
/// Non-fatal problems (a stylesheet that fails to compile, lint findings)
/// are reported through the returned [`TransformReport`]; an `Err` means
/// the transform could not do its job at all (e.g. a failed write).
pub trait AssetTransform: Send + Sync + fmt::Debug {
    /// Short name used in logs (`css`, `js`, `img`, ...).
    fn name(&self) -> &str;

    fn run(&self) -> Result<TransformReport>;
}
