//! Top-level declarations.

use freec_common::Span;

use crate::expr::{Expr, VarPat};
use crate::name::{DeclIdent, Name};
use crate::types::{Type, TypeSchema, TypeVarDecl};

/// A data constructor declaration: name plus field types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConDecl {
    pub ident: DeclIdent,
    pub fields: Vec<Type>,
}

/// An algebraic data type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataDecl {
    pub span: Span,
    pub ident: DeclIdent,
    pub type_args: Vec<TypeVarDecl>,
    pub cons: Vec<ConDecl>,
}

/// A type synonym declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSynDecl {
    pub span: Span,
    pub ident: DeclIdent,
    pub type_args: Vec<TypeVarDecl>,
    pub body: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDecl {
    Data(DataDecl),
    Syn(TypeSynDecl),
}

impl TypeDecl {
    #[must_use]
    pub fn ident(&self) -> &DeclIdent {
        match self {
            TypeDecl::Data(d) => &d.ident,
            TypeDecl::Syn(d) => &d.ident,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            TypeDecl::Data(d) => d.span,
            TypeDecl::Syn(d) => d.span,
        }
    }

    #[must_use]
    pub fn type_args(&self) -> &[TypeVarDecl] {
        match self {
            TypeDecl::Data(d) => &d.type_args,
            TypeDecl::Syn(d) => &d.type_args,
        }
    }
}

/// A type signature: `f :: forall a. a -> a`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSig {
    pub span: Span,
    pub name: Name,
    pub schema: TypeSchema,
}

/// A top-level function binding.
///
/// `type_args` and `return_type` are distributed from the signature before
/// code generation; the parser leaves them empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncDecl {
    pub span: Span,
    pub ident: DeclIdent,
    pub type_args: Vec<TypeVarDecl>,
    pub args: Vec<VarPat>,
    pub body: Expr,
    pub return_type: Option<Type>,
}

impl FuncDecl {
    /// Number of value arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// An unrestricted module import: `import M`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    pub span: Span,
    pub module: String,
}
