// src/config/mod.rs

//! Configuration loading and validation for assetflow.
//!
//! Responsibilities:
//! - Define the TOML/JSON-backed data model (`model.rs`).
//! - Flatten and resolve the `paths` mapping (`paths.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate that every path a component needs is present (`validate.rs`).

pub mod loader;
pub mod model;
pub mod paths;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, ImagesSection, JsSection, PathNode, RawConfigFile, ServerSection, SiteSection,
    WatchSection,
};
pub use paths::PathConfig;
