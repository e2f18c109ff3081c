//! Intermediate representation for the freec compiler.
//!
//! The IR is an immutable tree produced by the parser and consumed by the
//! analysis and backend passes. Every node carries a byte-offset `Span`.
//!
//! This crate provides:
//! - `Name` / `QName` - identifiers and operator symbols, optionally qualified
//! - `Type` / `TypeSchema` - first-order types with prenex type variables
//! - `Expr` - expressions with one-level `case` patterns
//! - `TypeDecl` / `FuncDecl` / `TypeSig` / `Module` - declarations

pub mod decl;
pub mod expr;
pub mod module;
pub mod name;
pub mod types;

pub use decl::{ConDecl, DataDecl, FuncDecl, ImportDecl, TypeDecl, TypeSig, TypeSynDecl};
pub use expr::{Alt, ConPat, Expr, ExprKind, VarPat};
pub use module::Module;
pub use name::{DeclIdent, Name, QName, is_valid_ident};
pub use types::{Type, TypeSchema, TypeVarDecl};
