//! Dependency and termination analysis.
//!
//! This crate provides:
//! - `dependency` - declaration dependency graphs, SCC condensation in
//!   reverse-topological order, recursion labeling
//! - `termination` - decreasing-argument search by syntactic structural
//!   descent

pub mod dependency;
pub mod termination;

pub use dependency::{Component, func_components, type_components};
pub use termination::find_decreasing_args;
