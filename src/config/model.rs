// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::config::paths::PathConfig;

/// Top-level configuration as read from disk.
///
/// ```toml
/// [paths]
/// src = "src/"
/// build = "_site/"
///
/// [paths.css]
/// src = "src/_assets/css/"
/// dest = "src/assets/css/"
///
/// [site]
/// command = "jekyll"
///
/// [server]
/// port = 3000
/// ```
///
/// The same shape can be read from an npm `package.json`; every key other
/// than the ones below is ignored.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Nested `paths` mapping, flattened into dotted keys on validation.
    #[serde(default)]
    pub paths: BTreeMap<String, PathNode>,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub js: JsSection,

    #[serde(default)]
    pub images: ImagesSection,
}

/// One node of the `paths` tree: either a path string or a nested group.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PathNode {
    Leaf(String),
    Group(BTreeMap<String, PathNode>),
}

/// `[site]` section: how the static site generator is invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSection {
    /// Generator binary, e.g. `jekyll`.
    #[serde(default = "default_site_command")]
    pub command: String,

    /// Arguments placed before `--config <file>`.
    #[serde(default = "default_site_args")]
    pub args: Vec<String>,

    /// Generator config used for development builds.
    #[serde(default = "default_site_config")]
    pub config: String,

    /// Generator config used for production builds.
    #[serde(default = "default_site_prod_config")]
    pub prod_config: String,

    /// Kill the generator after this many seconds. No limit when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_site_command() -> String {
    "jekyll".to_string()
}

fn default_site_args() -> Vec<String> {
    vec!["build".to_string()]
}

fn default_site_config() -> String {
    "_config.yml".to_string()
}

fn default_site_prod_config() -> String {
    "_config.build.yml".to_string()
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            command: default_site_command(),
            args: default_site_args(),
            config: default_site_config(),
            prod_config: default_site_prod_config(),
            timeout_secs: None,
        }
    }
}

/// `[server]` section for the development server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Window in which bursts of filesystem events are coalesced.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Extra globs (relative to the project root) that never trigger a rule.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            exclude: Vec::new(),
        }
    }
}

/// `[js]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JsSection {
    /// Run the built-in linter over the main bundle.
    #[serde(default = "default_true")]
    pub lint: bool,
}

fn default_true() -> bool {
    true
}

impl Default for JsSection {
    fn default() -> Self {
        Self { lint: true }
    }
}

/// `[images]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ImagesSection {
    /// Shell command template with `{input}` and `{output}` placeholders.
    /// Images are copied unchanged when this is not set.
    #[serde(default)]
    pub optimizer: Option<String>,
}

/// Validated configuration.
///
/// Built once at startup and passed by reference to every component; the
/// path mapping is guaranteed to contain every required key.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathConfig,
    pub site: SiteSection,
    pub server: ServerSection,
    pub watch: WatchSection,
    pub js: JsSection,
    pub images: ImagesSection,
}

impl ConfigFile {
    /// Assemble a config from parts that have already been validated.
    pub(crate) fn new_unchecked(raw: RawConfigFile, paths: PathConfig) -> Self {
        Self {
            paths,
            site: raw.site,
            server: raw.server,
            watch: raw.watch,
            js: raw.js,
            images: raw.images,
        }
    }

    /// Re-anchor every relative path at `root` (the project directory).
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.paths = self.paths.with_root(root);
        self
    }

    /// Project root all relative paths resolve against.
    pub fn root(&self) -> &std::path::Path {
        self.paths.root()
    }
}
