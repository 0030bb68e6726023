// src/site/mod.rs

//! Static site generator invocation.
//!
//! [`SiteBuilder`] is the only component that talks to a subprocess. It
//! resolves the generator config from the [`BuildEnvironment`], runs the
//! generator, forwards its stdout and turns the exit status into a
//! `Result`.

pub mod builder;

pub use builder::SiteBuilder;

use crate::errors::Result;
use crate::types::{BoxFuture, BuildEnvironment};

/// Seam between the task registry and the generator process, so tests can
/// substitute a recording fake.
pub trait SiteBuild: Send + Sync {
    /// Run a full site build for `env`. Resolves once the generator exits.
    fn build(&self, env: BuildEnvironment) -> BoxFuture<'_, Result<()>>;
}
