//! Gallina code generation.
//!
//! This crate provides:
//! - `gallina` - the Gallina sentence and term AST
//! - `printer` - deterministic rendering of sentences to text
//! - `Converter` - the conversion context (environment, fresh names, reporter)
//! - `types` / `exprs` - the monadic lifting of types and expressions
//! - `recursion` - the driver/helper split for recursive functions
//! - `decls` / `module` - declaration conversion and the per-module pipeline

pub mod context;
pub mod decls;
pub mod exprs;
pub mod gallina;
pub mod module;
pub mod printer;
pub mod recursion;
pub mod types;

pub use context::Converter;
pub use module::convert_module;
pub use printer::print_sentences;
