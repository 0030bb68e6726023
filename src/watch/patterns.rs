// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::types::TaskName;

/// A binding from path globs to the pipeline a change should run.
///
/// Globs are relative to the project root, using `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRule {
    pub name: String,
    pub pipeline: TaskName,
    pub globs: Vec<String>,
}

impl WatchRule {
    pub fn new(name: impl Into<String>, pipeline: impl Into<TaskName>, globs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            pipeline: pipeline.into(),
            globs,
        }
    }
}

/// Compiled form of a [`WatchRule`] plus the shared exclude set.
#[derive(Clone)]
pub struct RuleProfile {
    name: String,
    pipeline: TaskName,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for RuleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleProfile")
            .field("name", &self.name)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl RuleProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// True if `rel_path` (relative to the project root, e.g.
    /// `"_sass/_base.scss"`) should trigger this rule.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Compile every rule; `exclude` applies to all of them.
pub fn build_rule_profiles(rules: &[WatchRule], exclude: &[String]) -> Result<Vec<RuleProfile>> {
    let exclude_set = if exclude.is_empty() {
        None
    } else {
        Some(build_globset(exclude).context("building exclude globset")?)
    };

    rules
        .iter()
        .map(|rule| {
            let watch_set = build_globset(&rule.globs)
                .with_context(|| format!("building watch globset for rule {}", rule.name))?;
            Ok(RuleProfile {
                name: rule.name.clone(),
                pipeline: rule.pipeline.clone(),
                watch_set,
                exclude_set: exclude_set.clone(),
            })
        })
        .collect()
}

/// `*` stays within one path segment; `**` crosses directories.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
