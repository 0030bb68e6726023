// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::paths::{PathConfig, OPTIONAL_KEYS, REQUIRED_KEYS};
use crate::errors::{AssetflowError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let paths = validate_paths(&raw)?;
        validate_site(&raw)?;
        validate_server_and_watch(&raw)?;
        Ok(ConfigFile::new_unchecked(raw, paths))
    }
}

fn validate_paths(cfg: &RawConfigFile) -> Result<PathConfig> {
    if cfg.paths.is_empty() {
        return Err(AssetflowError::ConfigError(
            "config must contain a `paths` mapping".to_string(),
        ));
    }

    let entries = PathConfig::flatten(&cfg.paths);

    for key in REQUIRED_KEYS {
        match entries.get(*key) {
            Some(value) if !value.trim().is_empty() => {}
            _ => return Err(AssetflowError::MissingPath(key.to_string())),
        }
    }

    for key in entries.keys() {
        if !REQUIRED_KEYS.contains(&key.as_str()) && !OPTIONAL_KEYS.contains(&key.as_str()) {
            warn!(key = %key, "unknown key in `paths`; ignoring");
        }
    }

    Ok(PathConfig::new(".", entries))
}

fn validate_site(cfg: &RawConfigFile) -> Result<()> {
    if cfg.site.command.trim().is_empty() {
        return Err(AssetflowError::ConfigError(
            "[site].command must not be empty".to_string(),
        ));
    }
    if cfg.site.config.trim().is_empty() || cfg.site.prod_config.trim().is_empty() {
        return Err(AssetflowError::ConfigError(
            "[site].config and [site].prod_config must not be empty".to_string(),
        ));
    }
    if cfg.site.timeout_secs == Some(0) {
        return Err(AssetflowError::ConfigError(
            "[site].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_server_and_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(AssetflowError::ConfigError(
            "[server].port must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.watch.debounce_ms == 0 {
        return Err(AssetflowError::ConfigError(
            "[watch].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
