// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// Files ending in `.json` (e.g. an npm `package.json`) are parsed as JSON,
/// everything else as TOML. This only performs deserialization; use
/// [`load_and_validate`] for the semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let config: RawConfigFile = if is_json {
        serde_json::from_str(&contents)?
    } else {
        toml::from_str(&contents)?
    };

    Ok(config)
}

/// Load a configuration file from path, validate it and anchor every
/// relative path at the directory holding the file.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config.with_root(config_root_dir(path)))
}

/// Figure out the project root for a config path.
///
/// - If the config path has a non-empty parent (e.g. "site/Assetflow.toml"),
///   we use that directory.
/// - If it's just a bare filename, we fall back to the current working
///   directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
