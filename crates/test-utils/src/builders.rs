#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use assetflow::config::{ConfigFile, PathNode, RawConfigFile};
use assetflow::errors::Result;

/// A Jekyll-style layout: sources under `src/_assets`, generated assets
/// under `src/assets`, site output in `_site`.
pub const DEFAULT_PATHS: &[(&str, &str)] = &[
    ("src", "src"),
    ("css.src", "src/_assets/css"),
    ("css.dest", "src/assets/css"),
    ("sass.src", "src/_assets/sass"),
    ("sass.vendor", "src/_assets/sass/vendor"),
    ("js.src", "src/_assets/js"),
    ("js.dest", "src/assets/js"),
    ("vendor.src", "src/_assets/vendor"),
    ("vendor.dest", "src/assets/js"),
    ("img.src", "src/_assets/img"),
    ("img.dest", "src/assets/img"),
    ("build", "_site"),
];

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
    root: PathBuf,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            config: RawConfigFile::default(),
            root: PathBuf::from("."),
        };
        for (key, value) in DEFAULT_PATHS {
            builder = builder.with_path(key, value);
        }
        builder
    }

    /// Project root relative paths resolve against.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set a dotted path key, creating nested groups as needed.
    pub fn with_path(mut self, key: &str, value: &str) -> Self {
        let parts: Vec<&str> = key.split('.').collect();
        insert_path(&mut self.config.paths, &parts, value);
        self
    }

    pub fn without_path(mut self, key: &str) -> Self {
        let parts: Vec<&str> = key.split('.').collect();
        remove_path(&mut self.config.paths, &parts);
        self
    }

    pub fn with_site_command(mut self, command: &str, args: &[&str]) -> Self {
        self.config.site.command = command.to_string();
        self.config.site.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_site_timeout(mut self, secs: u64) -> Self {
        self.config.site.timeout_secs = Some(secs);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.config.watch.debounce_ms = ms;
        self
    }

    pub fn with_exclude(mut self, glob: &str) -> Self {
        self.config.watch.exclude.push(glob.to_string());
        self
    }

    pub fn with_js_lint(mut self, lint: bool) -> Self {
        self.config.js.lint = lint;
        self
    }

    pub fn with_image_optimizer(mut self, template: &str) -> Self {
        self.config.images.optimizer = Some(template.to_string());
        self
    }

    pub fn raw(&self) -> &RawConfigFile {
        &self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        Ok(ConfigFile::try_from(self.config)?.with_root(self.root))
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_path(nodes: &mut BTreeMap<String, PathNode>, parts: &[&str], value: &str) {
    let Some((head, rest)) = parts.split_first() else {
        return;
    };
    if rest.is_empty() {
        nodes.insert(head.to_string(), PathNode::Leaf(value.to_string()));
        return;
    }

    let entry = nodes
        .entry(head.to_string())
        .or_insert_with(|| PathNode::Group(BTreeMap::new()));
    if let PathNode::Leaf(_) = entry {
        *entry = PathNode::Group(BTreeMap::new());
    }
    if let PathNode::Group(children) = entry {
        insert_path(children, rest, value);
    }
}

fn remove_path(nodes: &mut BTreeMap<String, PathNode>, parts: &[&str]) {
    let Some((head, rest)) = parts.split_first() else {
        return;
    };
    if rest.is_empty() {
        nodes.remove(*head);
        return;
    }
    if let Some(PathNode::Group(children)) = nodes.get_mut(*head) {
        remove_path(children, rest);
    }
}
