//! Module interfaces - the exported entries of a compiled module.
//!
//! Interfaces are written as JSON next to the generated `.v` files and
//! loaded back when another module imports the compiled one.

use serde::{Deserialize, Serialize};

use freec_ir::{Name, QName, Type};

use crate::entry::{Entry, EntryKind, Scope};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IfaceData {
    pub name: Name,
    pub arity: usize,
    pub target: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IfaceSyn {
    pub name: Name,
    pub type_args: Vec<String>,
    pub body: Type,
    pub target: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IfaceCon {
    pub name: Name,
    pub arity: usize,
    pub target: String,
    pub smart_target: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IfaceFunc {
    pub name: Name,
    pub arity: usize,
    pub type_args: Vec<String>,
    pub partial: bool,
    pub target: String,
}

/// Everything a module exports.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModuleInterface {
    pub name: String,
    pub types: Vec<IfaceData>,
    pub type_syns: Vec<IfaceSyn>,
    pub constructors: Vec<IfaceCon>,
    pub functions: Vec<IfaceFunc>,
}

impl ModuleInterface {
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        ModuleInterface {
            name: name.into(),
            types: Vec::new(),
            type_syns: Vec::new(),
            constructors: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Materialize the interface as environment entries, with originals
    /// qualified by the defining module.
    #[must_use]
    pub fn entries(&self) -> Vec<(Scope, QName, Entry)> {
        let mut out = Vec::new();
        for data in &self.types {
            let name = QName::qualified(&*self.name, data.name.clone());
            out.push((
                Scope::Type,
                name.clone(),
                Entry {
                    original: name,
                    target: data.target.clone(),
                    kind: EntryKind::Data { arity: data.arity },
                },
            ));
        }
        for syn in &self.type_syns {
            let name = QName::qualified(&*self.name, syn.name.clone());
            out.push((
                Scope::Type,
                name.clone(),
                Entry {
                    original: name,
                    target: syn.target.clone(),
                    kind: EntryKind::TypeSyn {
                        arity: syn.type_args.len(),
                        type_args: syn.type_args.clone(),
                        body: syn.body.clone(),
                    },
                },
            ));
        }
        for con in &self.constructors {
            let name = QName::qualified(&*self.name, con.name.clone());
            out.push((
                Scope::Value,
                name.clone(),
                Entry {
                    original: name,
                    target: con.target.clone(),
                    kind: EntryKind::Con {
                        arity: con.arity,
                        arg_types: Vec::new(),
                        return_type: None,
                        smart_target: con.smart_target.clone(),
                    },
                },
            ));
        }
        for func in &self.functions {
            let name = QName::qualified(&*self.name, func.name.clone());
            out.push((
                Scope::Value,
                name.clone(),
                Entry {
                    original: name,
                    target: func.target.clone(),
                    kind: EntryKind::Func {
                        arity: func.arity,
                        type_args: func.type_args.clone(),
                        arg_types: Vec::new(),
                        return_type: None,
                        partial: func.partial,
                    },
                },
            ));
        }
        out
    }
}
