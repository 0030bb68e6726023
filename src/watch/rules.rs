// src/watch/rules.rs

use anyhow::Result;
use tracing::debug;

use crate::assets::css::CSS_ENTRY;
use crate::config::{ConfigFile, PathConfig};
use crate::tasks::standard::names;
use crate::watch::patterns::{RuleProfile, WatchRule, build_rule_profiles};

pub const CSS_RULE: &str = "css";
pub const JS_RULE: &str = "js";
pub const IMG_RULE: &str = "img";
pub const CONTENT_RULE: &str = "content";

/// Keys whose directories receive generated output.
const DEST_KEYS: &[&str] = &["css.dest", "js.dest", "vendor.dest", "img.dest"];

/// Keys whose directories hold watched sources.
const SOURCE_KEYS: &[&str] = &["css.src", "js.src", "vendor.src", "img.src", "sass.src"];

/// Join a root-relative base and a glob tail; an empty base is the root.
fn under(base: &str, tail: &str) -> String {
    if base.is_empty() {
        tail.to_string()
    } else {
        format!("{base}/{tail}")
    }
}

/// The four rules a serve session watches.
pub fn standard_rules(paths: &PathConfig) -> Result<Vec<WatchRule>> {
    let src = paths.site_src_base();
    let css = paths.glob_base("css.src")?;
    let sass = paths.glob_base("sass.src")?;
    let js = paths.glob_base("js.src")?;
    let vendor = paths.glob_base("vendor.src")?;
    let img = paths.glob_base("img.src")?;

    Ok(vec![
        WatchRule::new(
            CSS_RULE,
            names::WATCH_CSS,
            vec![
                under(&src, "fonts/*"),
                under(&sass, "*.scss"),
                under(&css, CSS_ENTRY),
                under(&sass, "**/*.scss"),
            ],
        ),
        WatchRule::new(
            JS_RULE,
            names::WATCH_JS,
            vec![under(&js, "*.js"), under(&vendor, "*.js")],
        ),
        WatchRule::new(
            IMG_RULE,
            names::WATCH_IMG,
            vec![under(&img, "*"), under(&img, "**/*")],
        ),
        WatchRule::new(
            CONTENT_RULE,
            names::WATCH_CONTENT,
            vec![
                under(&src, "*"),
                under(&src, "_data/*"),
                under(&src, "_plugins/*"),
                under(&src, "**/*.md"),
                under(&src, "**/*.html"),
                under(&src, "**/*.markdown"),
                under(&src, "_includes/**/*.md"),
                under(&src, "_includes/**/*.svg"),
                under(&src, "_includes/**/*.html"),
            ],
        ),
    ])
}

/// Globs no rule may match: the site output, generated asset directories,
/// VCS metadata and whatever the user listed under `[watch].exclude`.
///
/// A destination that is also (or contains) a source directory is left out,
/// otherwise its sources could never trigger.
pub fn default_excludes(cfg: &ConfigFile) -> Result<Vec<String>> {
    let paths = &cfg.paths;
    let mut out = vec![".git/**".to_string()];

    let build = paths.glob_base("build")?;
    if !build.is_empty() {
        out.push(under(&build, "**"));
    }

    let sources: Vec<String> = SOURCE_KEYS
        .iter()
        .map(|k| paths.glob_base(k))
        .collect::<Result<_, _>>()?;

    for key in DEST_KEYS {
        let dest = paths.glob_base(key)?;
        let shadows_source = dest.is_empty()
            || sources
                .iter()
                .any(|s| *s == dest || s.starts_with(&format!("{dest}/")));
        if shadows_source {
            debug!(key, dest = %dest, "destination overlaps a source directory; not excluded");
            continue;
        }
        let glob = under(&dest, "**");
        if !out.contains(&glob) {
            out.push(glob);
        }
    }

    out.extend(cfg.watch.exclude.iter().cloned());
    Ok(out)
}

/// Compiled rules for a session.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    profiles: Vec<RuleProfile>,
}

impl RuleSet {
    pub fn new(profiles: Vec<RuleProfile>) -> Self {
        Self { profiles }
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let rules = standard_rules(&cfg.paths)?;
        let exclude = default_excludes(cfg)?;
        Ok(Self::new(build_rule_profiles(&rules, &exclude)?))
    }

    pub fn profiles(&self) -> &[RuleProfile] {
        &self.profiles
    }

    /// Rules matched by at least one path of `batch`, each listed once, in
    /// rule order.
    pub fn matching(&self, batch: &[String]) -> Vec<&RuleProfile> {
        self.profiles
            .iter()
            .filter(|p| batch.iter().any(|path| p.matches(path)))
            .collect()
    }
}
