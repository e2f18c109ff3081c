//! Modules - the unit of compilation.

use freec_common::Span;

use crate::decl::{FuncDecl, ImportDecl, TypeDecl, TypeSig};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub span: Span,
    /// Module name from the header; `None` for a headerless file.
    pub name: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub type_decls: Vec<TypeDecl>,
    pub type_sigs: Vec<TypeSig>,
    pub func_decls: Vec<FuncDecl>,
}

impl Module {
    /// The name used for the emitted Coq module.
    #[must_use]
    pub fn coq_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Main")
    }
}
