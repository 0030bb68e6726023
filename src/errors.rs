// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing configuration path: `paths.{0}` is not set")]
    MissingPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in task graph involving task '{0}'")]
    TaskCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("ERROR: site generator process exited with code: {code}")]
    SiteBuildFailed { code: i32 },

    #[error("site generator did not finish within {secs}s and was killed")]
    SiteBuildTimedOut { secs: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<tokio::task::JoinError> for AssetflowError {
    fn from(err: tokio::task::JoinError) -> Self {
        AssetflowError::Other(anyhow::Error::from(err))
    }
}

pub type Result<T> = std::result::Result<T, AssetflowError>;
