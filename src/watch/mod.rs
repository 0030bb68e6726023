// src/watch/mod.rs

//! Filesystem watching for the serve session.
//!
//! - [`patterns`]: glob compilation and per-rule matching.
//! - [`rules`]: the four standard watch rules derived from the path config.
//! - [`debounce`]: coalescing of raw events into change batches.
//! - [`watcher`]: the `notify` bridge that feeds batches to the engine.

pub mod debounce;
pub mod path_utils;
pub mod patterns;
pub mod rules;
pub mod watcher;

pub use debounce::ChangeBatcher;
pub use patterns::{RuleProfile, WatchRule, build_rule_profiles};
pub use rules::{RuleSet, standard_rules};
pub use watcher::{WatcherHandle, spawn_watcher};
