//! Names - identifiers and operator symbols.
//!
//! A `Name` is either an identifier (`foldr`, `Tree`) or an operator symbol
//! (`+`, `:`). A `QName` optionally qualifies a name with its module; the
//! environment treats the qualified and unqualified forms as the same
//! logical name for lookup.

use serde::{Deserialize, Serialize};

use freec_common::Span;

/// An unqualified source name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Name {
    /// An alphanumeric identifier matching `[A-Za-z_][A-Za-z0-9_']*`.
    Ident(String),
    /// An operator symbol, e.g. `+` or `:`.
    Symbol(String),
}

impl Name {
    pub fn ident(s: impl Into<String>) -> Self {
        Name::Ident(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Name::Symbol(s.into())
    }

    /// The raw name text, without operator parentheses.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Name::Ident(s) | Name::Symbol(s) => s,
        }
    }

    #[must_use]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Name::Symbol(_))
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Name::Ident(s) => write!(f, "{s}"),
            Name::Symbol(s) => write!(f, "({s})"),
        }
    }
}

/// A possibly module-qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Qualifying module, e.g. `Data.List` in `Data.List.map`.
    pub module: Option<String>,
    pub name: Name,
}

impl QName {
    pub fn unqualified(name: Name) -> Self {
        QName { module: None, name }
    }

    pub fn qualified(module: impl Into<String>, name: Name) -> Self {
        QName {
            module: Some(module.into()),
            name,
        }
    }

    pub fn ident(s: impl Into<String>) -> Self {
        QName::unqualified(Name::ident(s))
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        QName::unqualified(Name::symbol(s))
    }

    /// Drop the module qualifier.
    #[must_use]
    pub fn unqualify(&self) -> QName {
        QName {
            module: None,
            name: self.name.clone(),
        }
    }

    /// Replace the module qualifier.
    #[must_use]
    pub fn qualify(&self, module: &str) -> QName {
        QName {
            module: Some(module.to_string()),
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.module {
            Some(m) => write!(f, "{}.{}", m, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A binding occurrence of a name with its defining source span.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclIdent {
    pub span: Span,
    pub name: Name,
}

impl DeclIdent {
    pub fn new(span: Span, name: Name) -> Self {
        DeclIdent { span, name }
    }
}

/// Check whether `s` is a valid source identifier: `[A-Za-z_][A-Za-z0-9_']*`.
#[must_use]
pub fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\'')
}

#[cfg(test)]
#[path = "tests/name.rs"]
mod tests;
