//! Environment and renaming for the freec compiler.
//!
//! This crate provides:
//! - `Entry` / `EntryKind` - what the compiler knows about every name
//! - `Environment` - the two-scope (type/value) symbol table with frames
//! - the renamer - deterministic source-name to Gallina-identifier mapping
//! - `EnvConfig` - the TOML file of predefined entries
//! - `ModuleInterface` - exported entries of a compiled module

pub mod config;
pub mod entry;
pub mod environment;
pub mod interface;
pub mod renamer;

pub use config::EnvConfig;
pub use entry::{Entry, EntryKind, Scope};
pub use environment::{Environment, Lookup};
pub use interface::ModuleInterface;
