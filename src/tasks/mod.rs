// src/tasks/mod.rs

//! Named tasks and their composition.
//!
//! - [`runnable`]: the unit-of-work trait every leaf task implements.
//! - [`registry`]: name -> definition map plus sequential / parallel
//!   composition semantics.
//! - [`graph`]: petgraph view of the registry used for cycle detection and
//!   `--list` output.
//! - [`standard`]: the fixed set of tasks the tool ships with.

pub mod graph;
pub mod registry;
pub mod runnable;
pub mod standard;

pub use registry::{TaskDef, TaskRegistry};
pub use runnable::Runnable;
pub use standard::{Components, standard_registry};
