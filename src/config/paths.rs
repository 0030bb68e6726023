// src/config/paths.rs

//! The flattened `paths` mapping.
//!
//! Logical names are dotted keys (`css.src`, `img.dest`, `build`, ...). The
//! mapping is read-only after load; components look their paths up through
//! [`PathConfig::require`] / [`PathConfig::resolve`] when they are
//! constructed, so a missing key fails at startup rather than mid-run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::model::PathNode;
use crate::errors::{AssetflowError, Result};

/// Keys every configuration must provide.
pub const REQUIRED_KEYS: &[&str] = &[
    "css.src",
    "css.dest",
    "js.src",
    "js.dest",
    "vendor.src",
    "vendor.dest",
    "img.src",
    "img.dest",
    "sass.src",
    "sass.vendor",
    "build",
];

/// Keys that are understood but may be omitted.
///
/// - `src`: site source root, defaults to the project root.
/// - `bower`: enables the vendor stylesheet import.
/// - `tasks`: accepted for compatibility, tasks are registered statically.
pub const OPTIONAL_KEYS: &[&str] = &["src", "bower", "tasks"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    root: PathBuf,
    entries: BTreeMap<String, String>,
}

impl PathConfig {
    pub fn new(root: impl Into<PathBuf>, entries: BTreeMap<String, String>) -> Self {
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Flatten a nested `paths` tree into dotted keys.
    pub fn flatten(nodes: &BTreeMap<String, PathNode>) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for (key, node) in nodes {
            flatten_into(key, node, &mut out);
        }
        out
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Raw configured value for `key`, or [`AssetflowError::MissingPath`].
    pub fn require(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(AssetflowError::MissingPath(key.to_string())),
        }
    }

    /// Absolute (root-anchored) filesystem path for `key`.
    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        let value = self.require(key)?;
        Ok(self.root.join(value))
    }

    /// Like [`resolve`](Self::resolve) but for optional keys.
    pub fn resolve_optional(&self, key: &str) -> Option<PathBuf> {
        self.require(key).ok().map(|v| self.root.join(v))
    }

    /// Root-relative, slash-separated form of `key` for glob building.
    ///
    /// `"./src/_sass/"` becomes `"src/_sass"`; the project root itself
    /// becomes `""`.
    pub fn glob_base(&self, key: &str) -> Result<String> {
        let value = self.require(key)?;
        Ok(normalize_rel(value))
    }

    /// Glob base for the site source root (`src`), defaulting to the
    /// project root.
    pub fn site_src_base(&self) -> String {
        self.get("src").map(normalize_rel).unwrap_or_default()
    }
}

fn flatten_into(prefix: &str, node: &PathNode, out: &mut BTreeMap<String, String>) {
    match node {
        PathNode::Leaf(value) => {
            out.insert(prefix.to_string(), value.clone());
        }
        PathNode::Group(children) => {
            for (key, child) in children {
                flatten_into(&format!("{prefix}.{key}"), child, out);
            }
        }
    }
}

/// Normalize a configured path into a root-relative glob prefix.
pub fn normalize_rel(value: &str) -> String {
    let mut s = value.trim().replace('\\', "/");
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    let trimmed = s.trim_end_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}
