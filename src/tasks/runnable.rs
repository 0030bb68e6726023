// src/tasks/runnable.rs

use crate::errors::Result;
use crate::types::BoxFuture;

/// A leaf unit of work.
///
/// The returned future owns everything it needs, so the registry can spawn it
/// onto the runtime for parallel composition.
pub trait Runnable: Send + Sync {
    fn run(&self) -> BoxFuture<'static, Result<()>>;
}

impl<F> Runnable for F
where
    F: Fn() -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    fn run(&self) -> BoxFuture<'static, Result<()>> {
        (self)()
    }
}
